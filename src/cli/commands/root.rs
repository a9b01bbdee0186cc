//! root command - Show the root package that would be stripped

use crate::engine::{self, Context, FlattenOverrides, RootSource};
use crate::ui::output::{self, Verbosity};
use anyhow::Result;

/// Print the effective root prefix.
///
/// In quiet mode only the root itself is printed, so scripts can capture it.
pub fn root(ctx: &Context, overrides: FlattenOverrides) -> Result<()> {
    let prepared = engine::prepare(ctx, &overrides)?;
    let plan = &prepared.plan;
    let root = output::format_root(&plan.root);

    if ctx.quiet {
        println!("{}", root);
        return Ok(());
    }

    let verbosity = super::verbosity(ctx);
    output::print(format!("{} ({})", root, plan.root_source), verbosity);
    output::print(
        format!(
            "{} file(s) scanned, {} with a package declaration",
            prepared.snapshot.records.len(),
            prepared.snapshot.declared_count()
        ),
        verbosity,
    );
    if plan.root.is_empty() && plan.root_source == RootSource::Discovered {
        output::print(
            "The declared packages share no common prefix; nothing would move.",
            verbosity,
        );
    }
    if verbosity == Verbosity::Debug {
        output::print(format!("base dir: {}", plan.base_dir), verbosity);
    }

    Ok(())
}
