extern crate zts;

fn main() {
    let matches = zts::cli::parse_flags();
    let debug = matches.is_present("debug")
        || matches
            .subcommand()
            .1
            .map_or(false, |cmd| cmd.is_present("debug"));
    zts::utils::initialize_logging(debug);

    if let Err(err) = zts::run(&matches) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
