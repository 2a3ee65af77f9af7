//! CLI for sift
//!
//! Drives sandboxed WASM record filters from the command line:
//! - check: load a filter module and validate parameters against it
//! - run: stream records from a file through a filter

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
#[allow(dead_code)]
mod output;

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "sift - sandboxed WASM record filters", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a filter module loads and accepts the given parameters
    Check(commands::check::CheckArgs),

    /// Stream records from a file through a filter module
    Run(commands::run::RunArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => {
            init_tracing(args.verbose);
            commands::check::run(args)
        }
        Commands::Run(args) => {
            init_tracing(args.verbose);
            commands::run::run(args)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
