extern crate clap;
extern crate ziptree;

pub mod cli;
pub mod error;
pub mod report;
pub mod utils;

use std::path::Path;

use crate::error::{Error, Result};
use crate::report::{SizeColumns, SortKey};

/// Runs the subcommand selected on the command line.
pub fn run(matches: &clap::ArgMatches) -> Result<()> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    match matches.subcommand() {
        ("tree", Some(cmd)) => {
            let archive = required(cmd, "ARCHIVE")?;
            let options = utils::load_options(global_value(matches, cmd, "config"))?;
            let columns = SizeColumns::parse(cmd.value_of("sizes").unwrap_or("raw"))?;
            let sort_key = cmd.value_of("sort").map(SortKey::parse).transpose()?;
            report::show_tree(
                Path::new(archive),
                options,
                columns,
                sort_key,
                cmd.is_present("json"),
                &mut out,
                &mut err,
            )
        }
        ("summary", Some(cmd)) => {
            let archive = required(cmd, "ARCHIVE")?;
            let options = utils::load_options(global_value(matches, cmd, "config"))?;
            report::show_summary(Path::new(archive), options, &mut out, &mut err)
        }
        _ => Err(Error::CliInputError(
            "No command specified or unknown command. Use --help for available commands."
                .to_string(),
        )),
    }
}

/// Global flags may be given before or after the subcommand.
fn global_value<'a>(
    matches: &'a clap::ArgMatches,
    cmd: &'a clap::ArgMatches,
    name: &str,
) -> Option<&'a str> {
    cmd.value_of(name).or_else(|| matches.value_of(name))
}

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .value_of(name)
        .ok_or_else(|| Error::CliInputError(format!("{} is required.", name)))
}
