//! # pickup-cli
//!
//! Command-line front end for `pickup-core`.
//!
//! ## Module Organization
//! ```text
//! pickup_cli/
//! ├── lib.rs          ◄─── You are here (module exports)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── config.rs       ◄─── Environment configuration
//! └── commands.rs     ◄─── Subcommand implementations
//! ```
//!
//! The binary (`main.rs`) only sets up logging, loads [`config::CliConfig`],
//! and dispatches to [`commands::run`].

pub mod cli;
pub mod commands;
pub mod config;
