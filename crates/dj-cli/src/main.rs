use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    crab::{self, CrabArgs},
    hepdata::{self, HepdataArgs},
    inspect::{self, InspectArgs},
    trim::{self, TrimArgs},
    version::{self, VersionArgs},
};
use logging::LogFormat;

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "dj-release", about = "Dijet analysis grid jobs and HepData releases")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Log output format.
    #[arg(long, global = true, value_enum, env = "DJ_LOG_FORMAT", default_value_t = LogFormat::Human)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the CRAB configuration of a grid production.
    Crab(CrabArgs),
    /// Build a HepData submission from a maker plan.
    Hepdata(HepdataArgs),
    /// Apply an analysis range to one histogram or graph and print the result.
    Trim(TrimArgs),
    /// List the objects stored in a result file.
    Inspect(InspectArgs),
    /// Print the tool version.
    Version(VersionArgs),
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Crab(args) => crab::run(&args),
        Command::Hepdata(args) => hepdata::run(&args),
        Command::Trim(args) => trim::run(&args),
        Command::Inspect(args) => inspect::run(&args),
        Command::Version(args) => version::run(&args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format, logging::level_for(cli.verbose, cli.quiet));
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
