//! # Layout Command Implementation
//!
//! Prints the build layers of the bundle, one line per layer:
//!
//! ```text
//! 0: bzip2, zlib
//! 1: openssl
//! 2: curl
//! ```
//!
//! With `--tools` the tool layout (tool packages and what they require,
//! ordered by the holograph) is printed instead.

use anyhow::Result;
use clap::Args;

use bundle_synthesis::output::OutputConfig;

use crate::cli::GlobalOptions;

/// Print the build layers of the bundle
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Print the tool layout instead of the runtime layout.
    #[arg(long)]
    pub tools: bool,

    /// Print the layers as a JSON array of arrays.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `layout` command.
pub fn execute(args: LayoutArgs, options: &GlobalOptions) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(&options.color);
    let bundle = options.open_bundle()?;
    let layout = if args.tools {
        bundle.tool_layout()?
    } else {
        bundle.layout()?
    };

    if args.json {
        println!("{}", serde_json::to_string(layout)?);
        return Ok(());
    }

    for (index, layer) in layout.iter().enumerate() {
        let names: Vec<&str> = layer.iter().map(String::as_str).collect();
        println!("{} {}", out.dim(format!("{}:", index)), names.join(", "));
    }
    Ok(())
}
