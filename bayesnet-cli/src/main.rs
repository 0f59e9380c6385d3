//! bayesnet command line entry point.
//!
//! Results go to stdout, logs and errors to stderr. Exits with a non-zero status on
//! failure.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use args::{Cli, Command};

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.trace);
    let mut out = std::io::stdout().lock();
    match &cli.command {
        Command::Query(args) => commands::query(args, &mut out),
        Command::Check { network, tolerance } => commands::check(network, *tolerance, &mut out),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}
