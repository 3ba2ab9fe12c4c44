//! # Bundle Synthesis CLI
//!
//! This is the binary entry point for the `bundle-synthesis` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Installing the logger according to `--log-level`.
//! - Executing the appropriate command and turning library errors into
//!   user-facing messages with a non-zero exit code.
//!
//! All resolution logic lives in the `bundle_synthesis` library; the binary
//! only loads a bundle and prints what the library computes.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
