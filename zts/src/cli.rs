use clap;

pub fn app<'a, 'b>() -> clap::App<'a, 'b> {
    clap::App::new("zts")
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about("Show the content of zip-based packages with raw and download sizes")
        .arg(clap::Arg::from_usage("-d --debug 'Enable debug output'").global(true))
        .arg(
            clap::Arg::from_usage("-c, --config [config] 'JSON file with tree options'")
                .global(true),
        )
        .subcommand(
            clap::SubCommand::with_name("tree")
                .about("Print every entry of an archive, nested archives included")
                .arg(clap::Arg::from_usage("<ARCHIVE> 'Archive to inspect'"))
                .arg(
                    clap::Arg::from_usage("--sizes [sizes] 'Which sizes to print'")
                        .possible_values(&["raw", "download", "both"])
                        .default_value("raw"),
                )
                .arg(
                    clap::Arg::from_usage("--sort [sort] 'Order of entries in each directory'")
                        .possible_values(&["raw", "download", "name"]),
                )
                .arg(clap::Arg::from_usage("--json 'Print the tree as JSON'")),
        )
        .subcommand(
            clap::SubCommand::with_name("summary")
                .about("Print totals for an archive")
                .arg(clap::Arg::from_usage("<ARCHIVE> 'Archive to inspect'")),
        )
}

pub fn parse_flags<'a>() -> clap::ArgMatches<'a> {
    app().get_matches()
}
