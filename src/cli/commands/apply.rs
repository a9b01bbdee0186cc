//! apply command - Flatten the package directories
//!
//! # Flow
//!
//! 1. Scan and plan (same as `flat plan`)
//! 2. Show the preview
//! 3. Confirm, unless `--yes`; non-interactive runs without `--yes` refuse
//! 4. Execute through the journaled executor
//!
//! An aborted apply has already been rolled back by the executor by the
//! time it is reported here.

use crate::engine::{self, Context, ExecuteResult, Executor, FlattenOverrides};
use crate::ui::output;
use crate::ui::prompts::{self, PromptError};
use anyhow::{bail, Result};

/// Flatten the project.
pub fn apply(ctx: &Context, overrides: FlattenOverrides, dry_run: bool, yes: bool) -> Result<()> {
    let verbosity = super::verbosity(ctx);
    let prepared = engine::prepare(ctx, &overrides)?;
    let plan = &prepared.plan;

    super::print_plan_summary(plan, verbosity);
    output::print(plan.preview(), verbosity);
    if plan.is_empty() {
        return Ok(());
    }

    let collisions = plan.collisions();
    for collision in &collisions {
        output::warn(
            format!("{} is the destination of more than one file", collision),
            verbosity,
        );
    }

    if dry_run {
        output::print("Dry run: no files were moved.", verbosity);
        return Ok(());
    }

    if !yes {
        if !ctx.interactive {
            bail!("Refusing to move files without confirmation. Re-run with --yes.");
        }
        let question = format!("Move {} file(s)?", plan.move_count());
        match prompts::confirm(&question, collisions.is_empty(), true) {
            Ok(true) => {}
            Ok(false) | Err(PromptError::Cancelled) => {
                output::print("Aborted; no files were moved.", verbosity);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }

    let executor = Executor::new(&prepared.snapshot.root);
    match executor.execute(plan)? {
        ExecuteResult::Success {
            op_id,
            moved,
            pruned,
        } => {
            output::success(
                format!(
                    "Moved {} file(s), removed {} empty director{}. Run `flat undo` to revert ({}).",
                    moved,
                    pruned,
                    if pruned == 1 { "y" } else { "ies" },
                    op_id
                ),
                verbosity,
            );
            Ok(())
        }
        ExecuteResult::Aborted {
            op_id,
            error,
            rollback,
        } => {
            if rollback.complete {
                bail!(
                    "Apply aborted: {}. All {} step(s) were rolled back.",
                    error,
                    rollback.rolled_back.len()
                );
            }
            for (step, failure) in &rollback.failed {
                output::error(format!("could not {}: {}", step, failure));
            }
            bail!(
                "Apply aborted: {}. Rollback was incomplete; see journal {} and run `flat undo` after fixing the paths above.",
                error,
                op_id
            )
        }
    }
}
