use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    generate::{self, GenerateArgs},
    inspect::{self, InspectArgs},
};
use tracing_subscriber::filter::LevelFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "sbank-sim", version, about = "Stochastic template bank generator")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Log every accepted template (same as `--log-level debug`).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grow a template bank until proposals are rarely accepted.
    Generate(GenerateArgs),
    /// Summarise an existing bank file.
    Inspect(InspectArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.verbose);
    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Inspect(args) => inspect::run(&args),
    }
}

fn init_tracing(log_level: &str, verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO)
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
