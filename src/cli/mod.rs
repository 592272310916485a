//! CLI interface for oracle-keeper
//!
//! Provides subcommands for:
//! - `run`: Publish price updates, once or continuously
//! - `check`: Validate configuration and query the network
//! - `config`: Show the effective configuration

mod check;
mod run;
mod setup;

pub use check::CheckArgs;
pub use run::RunArgs;
pub use setup::{build_chain, build_collector, report_network};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "oracle-keeper")]
#[command(about = "Publishes changed stock prices to an on-chain price oracle")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run update cycles
    Run(RunArgs),
    /// Validate configuration and print network status
    Check(CheckArgs),
    /// Show effective configuration (secrets redacted)
    Config,
}
