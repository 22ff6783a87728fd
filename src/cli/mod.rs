//! Command line interface for scaffold_release.
//!
//! Parses arguments, builds the layered configuration and runs one release
//! with progress printed to the terminal.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
