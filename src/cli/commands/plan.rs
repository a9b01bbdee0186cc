//! plan command - Preview the moves without touching any file

use crate::engine::{self, Context, FlattenOverrides};
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Print the flatten plan, as a preview or as JSON.
pub fn plan(ctx: &Context, overrides: FlattenOverrides, json: bool) -> Result<()> {
    let prepared = engine::prepare(ctx, &overrides)?;
    let plan = &prepared.plan;

    if json {
        let rendered = serde_json::to_string_pretty(plan).context("Failed to serialize plan")?;
        println!("{}", rendered);
        return Ok(());
    }

    let verbosity = super::verbosity(ctx);
    super::print_plan_summary(plan, verbosity);
    output::print(plan.preview(), verbosity);
    for collision in plan.collisions() {
        output::warn(
            format!("{} is the destination of more than one file", collision),
            verbosity,
        );
    }

    Ok(())
}
