//! # Matrix Command Implementation
//!
//! Prints the CI matrix of one package, one entry per line:
//!
//! ```text
//! gcc5, gcc8 x shared, static
//! vs2019 x static
//! ```
//!
//! `--tool` prints the merged matrix of every tool requiring the package,
//! `--family` buckets the cells by compiler family instead of grouping them
//! and `--profile`/`--scheme` keep only cells whose names match the given
//! patterns from their start.

use anyhow::Result;
use clap::Args;

use bundle_synthesis::family;
use bundle_synthesis::matrix::{self, MatrixFilter};
use bundle_synthesis::output::OutputConfig;

use crate::cli::GlobalOptions;

/// Print the CI matrix of a package
#[derive(Args, Debug)]
pub struct MatrixArgs {
    /// Package whose matrix to print.
    pub package: String,

    /// Print the merged matrix of the tools requiring the package.
    #[arg(long)]
    pub tool: bool,

    /// Bucket profiles by compiler family.
    #[arg(long)]
    pub family: bool,

    /// Keep profiles matching this pattern.
    #[arg(long, value_name = "REGEX")]
    pub profile: Option<String>,

    /// Keep schemes matching this pattern.
    #[arg(long, value_name = "REGEX")]
    pub scheme: Option<String>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `matrix` command.
pub fn execute(args: MatrixArgs, options: &GlobalOptions) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(&options.color);
    let bundle = options.open_bundle()?;
    let package = bundle.get(&args.package)?;

    let filter = MatrixFilter::new(args.profile.as_deref(), args.scheme.as_deref())?;
    let cells = filter.apply(&package.cells(&bundle, args.tool));

    if args.family {
        let families = family::matrices(&cells, bundle.images());
        if args.json {
            println!("{}", serde_json::to_string_pretty(&families)?);
            return Ok(());
        }
        for family in &families {
            let image = family
                .image
                .as_deref()
                .map(|image| format!(" [{}]", image))
                .unwrap_or_default();
            println!(
                "{} ({} {}){}",
                out.strong(&family.group),
                family.compiler,
                family.arch,
                out.dim(image)
            );
            for entry in matrix::group(&family.cells) {
                println!("  {}", render(&entry));
            }
        }
        return Ok(());
    }

    let entries = matrix::group(&cells);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        println!("{}", render(entry));
    }
    Ok(())
}

fn render(entry: &matrix::MatrixEntry) -> String {
    let join = |items: &std::collections::BTreeSet<String>| {
        items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };
    format!("{} x {}", join(&entry.profiles), join(&entry.schemes))
}
