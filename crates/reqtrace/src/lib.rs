//! # reqtrace
//!
//! **CLI Binary**
//!
//! This is the entry point for the `reqtrace` command-line application.
//! It orchestrates the other crates to perform the requested actions.
//!
//! ## Responsibilities
//! * Parse command line arguments
//! * Discover the project root and load configuration
//! * Dispatch commands to appropriate handlers
//! * Handle errors and exit codes
//!
//! This crate should contain minimal business logic.

use anyhow::Result;
use clap::Parser;

use reqtrace_config as cli;

mod commands;
mod error_hints;
mod project_root;

/// Entry point used by the `reqtrace` binary.
pub fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    commands::dispatch(cli)
}

/// Render an error (with hints, when any apply) for the terminal.
pub fn format_error(err: &anyhow::Error) -> String {
    error_hints::format(err)
}
