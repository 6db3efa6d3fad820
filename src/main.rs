//! Disposable-email relay (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌────────────────────────────────────────────────┐
//!                         │                    RELAY                        │
//!     Client Request      │  ┌─────────┐   ┌──────────┐   ┌─────────────┐  │
//!     ────────────────────┼─▶│  http   │──▶│ handlers │──▶│ route table │  │
//!                         │  │ server  │   │ (checks) │   │  (per op)   │  │
//!                         │  └─────────┘   └──────────┘   └──────┬──────┘  │
//!                         │                                      ▼         │
//!     Client Response     │  ┌──────────┐   ┌────────────┐  ┌──────────┐   │
//!     ◀───────────────────┼──│ response │◀──│ProxyResult │◀─│ executor │◀──┼──── Upstream
//!                         │  │ envelope │   │            │  │ (reqwest)│   │     provider
//!                         │  └──────────┘   └────────────┘  └──────────┘   │
//!                         │                                                │
//!                         │  config · observability · lifecycle · mock     │
//!                         └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ephemail_relay::lifecycle::startup::{self, Mode};

#[derive(Parser)]
#[command(name = "ephemail-relay")]
#[command(about = "Relay for temporary-mailbox providers", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay requests to the configured upstream provider (default)
    Serve,
    /// Run the mock server with canned responses
    Mock,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal outside development.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mode = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => Mode::Relay,
        Commands::Mock => Mode::Mock,
    };

    startup::run(cli.config.as_deref(), mode).await?;
    Ok(())
}
