//! Command line arguments.
//!
//! - bayesnet query --network <file> --query <var>... [--evidence <Var=value>...]
//! - bayesnet check --network <file>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Exact inference in discrete Bayesian networks
#[derive(Parser, Debug)]
#[command(name = "bayesnet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log the steps of each query (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log every enumerated world (trace level)
    #[arg(long, global = true)]
    pub trace: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute posterior distributions
    Query(QueryArgs),

    /// Validate a network description and print its structure
    Check {
        /// Network description file
        #[arg(short, long)]
        network: PathBuf,

        /// Maximum deviation from 1 accepted for the sum of a CPT row
        #[arg(long, default_value_t = bayesnet::DEFAULT_TOLERANCE)]
        tolerance: f64,
    },
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Network description file
    #[arg(short, long)]
    pub network: PathBuf,

    /// Query variable, may be repeated
    #[arg(short, long = "query", required = true)]
    pub queries: Vec<String>,

    /// Observed value, as Var=value, may be repeated
    #[arg(short, long, value_parser = parse_observation)]
    pub evidence: Vec<(String, String)>,

    /// Print the posteriors as JSON
    #[arg(long)]
    pub json: bool,

    /// Refuse queries that would enumerate more worlds than this
    #[arg(long)]
    pub max_worlds: Option<u64>,

    /// Maximum deviation from 1 accepted for the sum of a CPT row
    #[arg(long, default_value_t = bayesnet::DEFAULT_TOLERANCE)]
    pub tolerance: f64,
}

fn parse_observation(s: &str) -> Result<(String, String), String> {
    let (var, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected Var=value, got `{}`", s))?;
    let (var, value) = (var.trim(), value.trim());
    if var.is_empty() || value.is_empty() {
        return Err(format!("expected Var=value, got `{}`", s));
    }
    Ok((var.to_owned(), value.to_owned()))
}
