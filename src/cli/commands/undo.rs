//! undo command - Revert the last apply
//!
//! An interrupted apply (journal still `in_progress`) is reverted before
//! any committed one. A partial undo leaves the journal in place so the
//! remaining paths can be fixed by hand.

use crate::engine::{Context, Executor, UndoResult};
use crate::ui::output;
use anyhow::{bail, Result};

/// Undo the last apply.
pub fn undo(ctx: &Context) -> Result<()> {
    let verbosity = super::verbosity(ctx);
    let executor = Executor::new(ctx.project_root()?);

    match executor.undo_last()? {
        UndoResult::NothingToUndo => {
            output::print("Nothing to undo.", verbosity);
            Ok(())
        }
        UndoResult::Undone { op_id, rollback } => {
            if rollback.complete {
                output::success(
                    format!(
                        "Undid {}: restored {} file(s).",
                        op_id,
                        rollback.restored_files()
                    ),
                    verbosity,
                );
                return Ok(());
            }

            for (step, failure) in &rollback.failed {
                output::error(format!("could not {}: {}", step, failure));
            }
            bail!(
                "Undo of {} was incomplete: {} step(s) failed, {} succeeded.",
                op_id,
                rollback.failed.len(),
                rollback.rolled_back.len()
            )
        }
    }
}
