//! # Dump Command Implementation
//!
//! Writes the resolved bundle (layouts, per-package used-by sets and
//! matrices, version diagnostics) as YAML or JSON, to stdout or to a file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use bundle_synthesis::dump::DumpFormat;
use bundle_synthesis::output::{emoji, OutputConfig};

use crate::cli::GlobalOptions;

/// Output format of the dump
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl From<Format> for DumpFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => DumpFormat::Yaml,
            Format::Json => DumpFormat::Json,
        }
    }
}

/// Write the resolved bundle as YAML or JSON
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    pub format: Format,

    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Execute the `dump` command.
pub fn execute(args: DumpArgs, options: &GlobalOptions) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(&options.color);
    let bundle = options.open_bundle()?;
    let rendered = bundle.dump()?.render(args.format.into())?;

    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {}",
                emoji(&out, "📝", "[WRITE]"),
                path.display()
            );
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
