//! # pickup-barcode
//!
//! Renders cafeteria pickup tokens as EAN-13 barcodes.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         pickup-barcode                                  │
//! │                                                                         │
//! │  env (PICKUP_*) ──► CliConfig ─┐                                       │
//! │                                ├──► commands::run ──► stdout / file    │
//! │  argv ──────────► clap Cli ────┘            │                          │
//! │                                             └──► tracing ──► stderr    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use pickup_cli::cli::Cli;
use pickup_cli::commands::{self, Outcome};
use pickup_cli::config::CliConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Invalid) => ExitCode::from(1),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info");
            return Err(err.into());
        }
    };
    init_tracing(&config.log_filter);
    debug!(?config, "Configuration loaded");

    commands::run(cli.command, &config)
}

/// Initializes logging to stderr; stdout carries SVG/HTML output.
///
/// `RUST_LOG` wins over `PICKUP_LOG` when both are set.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
