//! # Used-By Command Implementation
//!
//! Lists every package with a dependency path to the given package, one name
//! per line. Without `--tools` the runtime graph is searched; with it the
//! holograph is searched and only tool packages are listed, which is what
//! decides whether a tool-flavored CI configuration is needed.

use anyhow::Result;
use clap::Args;

use bundle_synthesis::output::{emoji, OutputConfig};

use crate::cli::GlobalOptions;

/// List the packages that transitively require a package
#[derive(Args, Debug)]
pub struct UsedByArgs {
    /// Package to look up.
    pub package: String,

    /// Search the holograph and list tool packages only.
    #[arg(long)]
    pub tools: bool,
}

/// Execute the `used-by` command.
pub fn execute(args: UsedByArgs, options: &GlobalOptions) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(&options.color);
    let bundle = options.open_bundle()?;
    let users = bundle.used_by(&args.package, args.tools)?;

    for name in users {
        println!("{}", name);
    }

    if args.tools && bundle.needs_tool_config(&args.package)? {
        eprintln!(
            "{} {} needs a tool configuration",
            emoji(&out, "🔧", "[TOOL]"),
            out.strong(&args.package)
        );
    }
    Ok(())
}
