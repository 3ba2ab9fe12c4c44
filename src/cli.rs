//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use bundle_synthesis::bundle::Bundle;
use bundle_synthesis::config::{self, ResolvedConfig};
use clap::{Parser, Subcommand};

use crate::commands;

/// Bundle Synthesis - Resolve build layers and CI matrices for a package bundle
#[derive(Parser, Debug)]
#[command(name = "bundle-synthesis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Bundle configuration document
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        default_value = "config.yml",
        env = "BUNDLE_CONFIG"
    )]
    config: PathBuf,

    /// Directory holding one `<package>/package.yml` per package
    /// (defaults to the configuration file's directory)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the whole bundle and report what was found
    Validate(commands::validate::ValidateArgs),

    /// Print the build layers of the bundle
    Layout(commands::layout::LayoutArgs),

    /// List the packages that transitively require a package
    UsedBy(commands::used_by::UsedByArgs),

    /// Print the CI matrix of a package
    Matrix(commands::matrix::MatrixArgs),

    /// Write the resolved bundle as YAML or JSON
    Dump(commands::dump::DumpArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Global options every bundle-reading command needs.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: PathBuf,
    pub root: Option<PathBuf>,
    pub color: String,
}

impl GlobalOptions {
    /// Load the bundle named by `--config` and `--root`.
    pub fn open_bundle(&self) -> Result<Bundle> {
        Bundle::open(&self.config, self.root.as_deref())
            .with_context(|| format!("Failed to load bundle from {}", self.config.display()))
    }

    /// Parse and merge the document named by `--config`.
    pub fn resolve_config(&self) -> bundle_synthesis::error::Result<ResolvedConfig> {
        config::from_file(&self.config)?.resolve()
    }

    /// Load the bundle from a configuration obtained by
    /// [`GlobalOptions::resolve_config`].
    pub fn open_resolved(&self, resolved: &ResolvedConfig) -> Result<Bundle> {
        Bundle::open_resolved(resolved, &self.config, self.root.as_deref())
            .with_context(|| format!("Failed to load bundle from {}", self.config.display()))
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let options = GlobalOptions {
            config: self.config,
            root: self.root,
            color: self.color,
        };

        match self.command {
            Commands::Validate(args) => commands::validate::execute(args, &options),
            Commands::Layout(args) => commands::layout::execute(args, &options),
            Commands::UsedBy(args) => commands::used_by::execute(args, &options),
            Commands::Matrix(args) => commands::matrix::execute(args, &options),
            Commands::Dump(args) => commands::dump::execute(args, &options),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Install `env_logger`, letting `RUST_LOG` override `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when embedded in tests
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
