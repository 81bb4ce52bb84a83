//! assetsync: fetch frontend asset builds for the current branch.
//!
//! # Usage
//!
//! ```text
//! assetsync fetch [--config <file>] [--branch <name>] [--force] [--failsafe]
//! assetsync inspect [--json] [--wait-for-deployments [--interval <secs>] [--timeout <secs>]]
//! assetsync environment [--branch <name>]
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{environment::EnvironmentArgs, fetch::FetchArgs, inspect::InspectArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "assetsync",
    version,
    about = "Synchronize prebuilt frontend assets for the current branch",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download and place every configured asset.
    Fetch(FetchArgs),

    /// Compare source and target revisions without changing anything.
    Inspect(InspectArgs),

    /// Print the environment each asset resolves to for a branch.
    Environment(EnvironmentArgs),
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Fetch(args) => args.run(),
        Commands::Inspect(args) => args.run(),
        Commands::Environment(args) => args.run(),
    }
}
