//! # Validate Command Implementation
//!
//! Resolves the whole bundle without writing anything and reports:
//!
//! - **Configuration**: whether the document parses and every override
//!   merges.
//! - **Packages**: how many packages (and tools) were loaded.
//! - **Graphs**: node and edge counts of the runtime graph and holograph.
//! - **Layering**: whether both graphs can be layered, i.e. contain no cycle.
//! - **Diagnostics**: every requirement whose version differs from the one the
//!   bundle pins. With `--strict` these fail the command too.

use anyhow::{anyhow, Result};
use bundle_synthesis::output::{emoji, OutputConfig};
use clap::Args;

use crate::cli::GlobalOptions;

/// Resolve the bundle and report problems
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Fail when version mismatches were found.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, options: &GlobalOptions) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(&options.color);
    println!(
        "{} Validating bundle: {}",
        emoji(&out, "🔍", "[SCAN]"),
        options.config.display()
    );

    let resolved = match options.resolve_config() {
        Ok(resolved) => resolved,
        Err(e) => {
            println!(
                "{} Configuration is invalid: {}",
                emoji(&out, "❌", "[ERR]"),
                e
            );
            return Err(anyhow!("Configuration is invalid: {}", e));
        }
    };
    println!(
        "{} Configuration parsed and merged",
        emoji(&out, "✅", "[OK]")
    );

    let bundle = match options.open_resolved(&resolved) {
        Ok(bundle) => bundle,
        Err(e) => {
            println!("{} {:#}", emoji(&out, "❌", "[ERR]"), e);
            return Err(e);
        }
    };

    let tools = bundle.packages().iter().filter(|p| p.is_tool()).count();
    println!("\n{} Bundle Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Packages: {}", bundle.packages().len());
    println!("   Tool packages: {}", tools);
    println!(
        "   Runtime graph: {} nodes, {} edges",
        bundle.runtime_graph().node_count(),
        bundle.runtime_graph().edge_count()
    );
    println!(
        "   Holograph: {} nodes, {} edges",
        bundle.holograph().node_count(),
        bundle.holograph().edge_count()
    );

    let mut has_errors = false;
    println!(
        "\n{} Checking for dependency cycles...",
        emoji(&out, "🔄", "[CHECK]")
    );
    match bundle.layout() {
        Ok(layout) => println!(
            "{} Runtime layout: {} layers",
            emoji(&out, "✅", "[OK]"),
            layout.len()
        ),
        Err(e) => {
            println!("{} Runtime graph: {}", emoji(&out, "❌", "[ERR]"), e);
            has_errors = true;
        }
    }
    match bundle.tool_layout() {
        Ok(layout) => println!(
            "{} Tool layout: {} layers",
            emoji(&out, "✅", "[OK]"),
            layout.len()
        ),
        Err(e) => {
            println!("{} Holograph: {}", emoji(&out, "❌", "[ERR]"), e);
            has_errors = true;
        }
    }

    let diagnostics = bundle.diagnostics();
    if diagnostics.is_empty() {
        println!("{} No version mismatches", emoji(&out, "✅", "[OK]"));
    } else {
        println!(
            "\n{} {} version mismatch(es), edges omitted:",
            emoji(&out, "⚠️", "[WARN]"),
            diagnostics.len()
        );
        for diagnostic in diagnostics {
            println!("   {}", out.warning(diagnostic));
        }
    }

    if has_errors {
        return Err(anyhow!("Bundle validation failed"));
    }
    if args.strict && !diagnostics.is_empty() {
        return Err(anyhow!(
            "Bundle validation failed: {} version mismatch(es) in strict mode",
            diagnostics.len()
        ));
    }

    println!("\n{} Bundle is valid", emoji(&out, "🎉", "[DONE]"));
    Ok(())
}
