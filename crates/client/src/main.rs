//! Battle simulator binary.
//!
//! Loads a unit catalog and a scenario from a content data directory and
//! resolves the battle in instant or animated mode.
//!
//! # Examples
//!
//! ```bash
//! # Instant resolution of the bundled skirmish
//! cargo run -p battle-client -- run skirmish --seed 7
//!
//! # Animated resolution with 200 ms per action, full JSON outcome
//! BATTLE_ACTION_DELAY_MS=200 cargo run -p battle-client -- run siege --mode animated --format json
//!
//! # List the unit catalog
//! cargo run -p battle-client -- units
//! ```

mod commands;
mod data;
mod presenter;

use anyhow::Result;
use clap::Parser;
use commands::{ListUnits, RunBattle};

/// Squad battle simulator
#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Resolve squad battles from data files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Resolve a scenario and print its outcome
    Run(RunBattle),

    /// List the unit types of the catalog
    Units(ListUnits),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists (for BATTLE_* variables)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute().await,
        Command::Units(cmd) => cmd.execute(),
    }
}
