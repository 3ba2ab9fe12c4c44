//! # CLI Command Implementations
//!
//! Each subcommand of the `bundle-synthesis` tool lives in its own file and
//! contains:
//! - An `Args` struct with the command-specific arguments, derived using
//!   `clap`.
//! - An `execute` function that loads the bundle through the global options
//!   and prints what the `bundle_synthesis` library computes.

pub mod completions;
pub mod dump;
pub mod layout;
pub mod matrix;
pub mod used_by;
pub mod validate;
