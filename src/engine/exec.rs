//! engine::exec
//!
//! The single transactional executor.
//!
//! # Architecture
//!
//! The Executor is the ONLY component allowed to move files. All
//! mutations flow through this module.
//!
//! # Executor Contract
//!
//! The executor:
//! 1. Acquires the project lock before any mutation
//! 2. Refuses to start while an interrupted operation is unresolved
//! 3. Writes the journal before the first mutation
//! 4. Checks each move's preconditions: the source exists and the
//!    destination does not
//! 5. Journals every directory it creates, file it moves and directory
//!    it prunes, fsync'd before moving on
//! 6. On any step failure: rolls back what was applied and records
//!    `rolled_back`, or leaves the journal `in_progress` for `undo` if
//!    the rollback was incomplete
//! 7. After success: records `committed` and releases the lock
//!
//! # Invariants
//!
//! - Only the Executor mutates the project
//! - All mutations are journaled
//! - Existing files are never overwritten
//! - Interrupted operations are recoverable via `undo`
//!
//! # Example
//!
//! ```ignore
//! use flatlayout::engine::exec::{ExecuteResult, Executor};
//!
//! let executor = Executor::new(&project_root);
//! match executor.execute(&plan)? {
//!     ExecuteResult::Success { moved, .. } => println!("moved {} files", moved),
//!     ExecuteResult::Aborted { error, .. } => eprintln!("aborted: {}", error),
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::plan::{Plan, PlanStep};
use super::rollback::{rollback_journal, RollbackResult};
use crate::core::ops::journal::{Journal, JournalError, OpId};
use crate::core::ops::lock::{LockError, ProjectLock};
use crate::core::paths::ProjectPaths;
use crate::core::types::SourcePath;

/// Errors that prevent execution from starting or finishing cleanly.
///
/// Failures of individual steps are not errors; they abort the plan and
/// are reported through [`ExecuteResult::Aborted`].
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Failed to acquire the project lock.
    #[error("failed to acquire lock: {0}")]
    LockFailed(#[from] LockError),

    /// Journal operation failed.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    /// A previous operation was interrupted.
    #[error("an interrupted operation must be resolved first: {command} ({op_id}); run `flat undo`")]
    OperationInProgress {
        /// Command of the interrupted operation
        command: String,
        /// Op ID of the interrupted operation
        op_id: String,
    },
}

/// Why a single step failed.
#[derive(Debug, Error)]
pub enum StepError {
    /// The file to move no longer exists.
    #[error("source {0} does not exist")]
    SourceMissing(SourcePath),

    /// Something already occupies the destination.
    #[error("destination {0} already exists")]
    DestinationExists(SourcePath),

    /// A filesystem operation failed.
    #[error("{path}: {source}")]
    Io {
        /// Path being modified.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The journal could not record the step.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),
}

/// Result of plan execution.
#[derive(Debug)]
pub enum ExecuteResult {
    /// Plan executed successfully.
    Success {
        /// Operation id (journal name).
        op_id: OpId,
        /// Number of files moved.
        moved: usize,
        /// Number of directories pruned.
        pruned: usize,
    },

    /// Execution aborted; everything applied so far was rolled back.
    Aborted {
        /// Operation id (journal name).
        op_id: OpId,
        /// Error that caused the abort.
        error: String,
        /// Outcome of the automatic rollback.
        rollback: RollbackResult,
    },
}

impl ExecuteResult {
    /// Check if execution succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ExecuteResult::Success { .. })
    }
}

/// Result of `undo`.
#[derive(Debug)]
pub enum UndoResult {
    /// No committed or interrupted operation was found.
    NothingToUndo,

    /// The operation was rolled back (fully, or partially if `rollback`
    /// reports failures).
    Undone {
        /// The operation that was reverted.
        op_id: OpId,
        /// Outcome of the rollback.
        rollback: RollbackResult,
    },
}

/// The executor for flatten plans.
#[derive(Debug, Clone)]
pub struct Executor {
    paths: ProjectPaths,
}

impl Executor {
    /// Create an executor for the project rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            paths: ProjectPaths::new(root),
        }
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    /// Execute a plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired, an interrupted
    /// operation exists, or the journal cannot be written.
    pub fn execute(&self, plan: &Plan) -> Result<ExecuteResult, ExecuteError> {
        let _lock = ProjectLock::acquire(&self.paths)?;

        if let Some(interrupted) = self.interrupted()? {
            return Err(ExecuteError::OperationInProgress {
                command: interrupted.command,
                op_id: interrupted.op_id.to_string(),
            });
        }

        let mut journal = Journal::with_op_id(plan.op_id.clone(), plan.command.clone());
        journal.plan_digest = Some(plan.digest());
        journal.write(&self.paths)?;
        log::info!("executing {} ({} steps)", plan.op_id, plan.step_count());

        let mut pruned = 0;
        for step in &plan.steps {
            let applied = match step {
                PlanStep::MoveFile { from, to, .. } => self.move_file(from, to, &mut journal),
                PlanStep::PruneEmptyDirs { dirs } => journal
                    .append_checkpoint(&self.paths, "moves complete")
                    .map_err(StepError::from)
                    .and_then(|()| self.prune_empty_dirs(dirs, &mut journal))
                    .map(|count| pruned += count),
            };

            if let Err(e) = applied {
                log::warn!("step failed, rolling back {}: {}", plan.op_id, e);
                let rollback = rollback_journal(&self.paths.root, &journal);
                // An incomplete rollback stays in progress so `undo` can retry it.
                if rollback.complete {
                    journal.rollback();
                    journal.write(&self.paths)?;
                }
                return Ok(ExecuteResult::Aborted {
                    op_id: plan.op_id.clone(),
                    error: e.to_string(),
                    rollback,
                });
            }
        }

        journal.commit();
        journal.write(&self.paths)?;

        Ok(ExecuteResult::Success {
            op_id: plan.op_id.clone(),
            moved: journal.moved_count(),
            pruned,
        })
    }

    /// Roll back the most recent operation.
    ///
    /// An interrupted operation takes precedence over the latest
    /// committed one.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired or journals cannot
    /// be read or written.
    pub fn undo_last(&self) -> Result<UndoResult, ExecuteError> {
        let _lock = ProjectLock::acquire(&self.paths)?;

        let target = match self.interrupted()? {
            Some(journal) => Some(journal),
            None => Journal::latest_committed(&self.paths)?,
        };
        let Some(mut journal) = target else {
            return Ok(UndoResult::NothingToUndo);
        };

        log::info!("undoing {} ({})", journal.op_id, journal.command);
        let rollback = rollback_journal(&self.paths.root, &journal);
        if rollback.complete {
            journal.rollback();
            journal.write(&self.paths)?;
        }

        Ok(UndoResult::Undone {
            op_id: journal.op_id.clone(),
            rollback,
        })
    }

    fn interrupted(&self) -> Result<Option<Journal>, JournalError> {
        Ok(Journal::list(&self.paths)?
            .into_iter()
            .rev()
            .find(|j| !j.phase.is_finished()))
    }

    fn move_file(
        &self,
        from: &SourcePath,
        to: &SourcePath,
        journal: &mut Journal,
    ) -> Result<(), StepError> {
        let source = from.under(&self.paths.root);
        let destination = to.under(&self.paths.root);

        if !source.is_file() {
            return Err(StepError::SourceMissing(from.clone()));
        }
        if destination.symlink_metadata().is_ok() {
            return Err(StepError::DestinationExists(to.clone()));
        }

        self.create_parents(&to.parent(), journal)?;

        fs::rename(&source, &destination).map_err(|source_err| StepError::Io {
            path: source.clone(),
            source: source_err,
        })?;
        log::debug!("moved {} -> {}", from, to);
        journal.append_file_moved(&self.paths, from.clone(), to.clone())?;
        Ok(())
    }

    /// Create each missing ancestor of `relative`, journaling each one.
    fn create_parents(&self, relative: &Path, journal: &mut Journal) -> Result<(), StepError> {
        let mut current = PathBuf::new();
        for component in relative.components() {
            current.push(component);
            let abs = self.paths.root.join(&current);
            if abs.is_dir() {
                continue;
            }
            fs::create_dir(&abs).map_err(|source| StepError::Io {
                path: abs.clone(),
                source,
            })?;
            journal.append_dir_created(&self.paths, current.clone())?;
        }
        Ok(())
    }

    /// Remove each vacated directory and its ancestors while they are empty.
    ///
    /// Stops at the project root. A directory that cannot be removed is
    /// left in place with a warning.
    fn prune_empty_dirs(&self, dirs: &[PathBuf], journal: &mut Journal) -> Result<usize, StepError> {
        let mut ordered: Vec<&PathBuf> = dirs.iter().collect();
        ordered.sort_by_key(|d| std::cmp::Reverse(d.components().count()));

        let mut pruned = 0;
        for dir in ordered {
            let mut current = dir.clone();
            while current.components().next().is_some() {
                let abs = self.paths.root.join(&current);
                if !is_empty_dir(&abs) {
                    break;
                }
                if let Err(e) = fs::remove_dir(&abs) {
                    log::warn!("could not prune {}: {}", abs.display(), e);
                    break;
                }
                log::debug!("pruned {}", current.display());
                journal.append_dir_removed(&self.paths, current.clone())?;
                pruned += 1;
                current.pop();
            }
        }
        Ok(pruned)
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ops::journal::OpPhase;
    use crate::core::types::{BaseDir, NamespacePath, RootPrefix};
    use crate::engine::plan::RootSource;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn plan(steps: Vec<PlanStep>) -> Plan {
        Plan::new(
            OpId::new(),
            "apply",
            RootPrefix::from(NamespacePath::parse("com.x", '.').unwrap()),
            RootSource::Discovered,
            BaseDir::parse("src").unwrap(),
        )
        .with_steps(steps)
    }

    fn move_step(from: &str, to: &str) -> PlanStep {
        PlanStep::MoveFile {
            from: SourcePath::parse(from).unwrap(),
            to: SourcePath::parse(to).unwrap(),
            namespace: NamespacePath::parse("com.x.a", '.').unwrap(),
        }
    }

    #[test]
    fn moves_prunes_and_commits() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/com/x/a/A.kt", "package com.x.a");

        let plan = plan(vec![
            move_step("src/com/x/a/A.kt", "src/a/A.kt"),
            PlanStep::PruneEmptyDirs {
                dirs: vec![PathBuf::from("src/com/x/a")],
            },
        ]);
        let result = Executor::new(root).execute(&plan).unwrap();

        match result {
            ExecuteResult::Success { moved, pruned, .. } => {
                assert_eq!(moved, 1);
                assert_eq!(pruned, 3);
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert!(root.join("src/a/A.kt").is_file());
        assert!(!root.join("src/com").exists());
        assert!(root.join("src").is_dir());

        let journal = Journal::read(&ProjectPaths::new(root), &plan.op_id).unwrap();
        assert_eq!(journal.phase, OpPhase::Committed);
        assert_eq!(journal.plan_digest, Some(plan.digest()));
    }

    #[test]
    fn existing_destination_aborts_and_rolls_back() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/com/x/a/A.kt", "first");
        write(root, "src/com/x/b/B.kt", "second");
        write(root, "src/b/B.kt", "occupant");

        let plan = plan(vec![
            move_step("src/com/x/a/A.kt", "src/a/A.kt"),
            move_step("src/com/x/b/B.kt", "src/b/B.kt"),
        ]);
        let result = Executor::new(root).execute(&plan).unwrap();

        match result {
            ExecuteResult::Aborted {
                error, rollback, ..
            } => {
                assert!(error.contains("already exists"), "{error}");
                assert!(rollback.complete);
            }
            other => panic!("expected abort, got {:?}", other),
        }
        assert!(root.join("src/com/x/a/A.kt").is_file());
        assert!(!root.join("src/a").exists());
        assert_eq!(fs::read_to_string(root.join("src/b/B.kt")).unwrap(), "occupant");

        let journal = Journal::read(&ProjectPaths::new(root), &plan.op_id).unwrap();
        assert_eq!(journal.phase, OpPhase::RolledBack);
    }

    #[test]
    fn missing_source_aborts() {
        let temp = TempDir::new().unwrap();
        let plan = plan(vec![move_step("src/com/x/a/A.kt", "src/a/A.kt")]);

        let result = Executor::new(temp.path()).execute(&plan).unwrap();
        assert!(!result.is_success());
    }

    #[test]
    fn undo_restores_latest_committed() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/com/x/a/A.kt", "package com.x.a");

        let executor = Executor::new(root);
        let plan = plan(vec![
            move_step("src/com/x/a/A.kt", "src/a/A.kt"),
            PlanStep::PruneEmptyDirs {
                dirs: vec![PathBuf::from("src/com/x/a")],
            },
        ]);
        assert!(executor.execute(&plan).unwrap().is_success());

        match executor.undo_last().unwrap() {
            UndoResult::Undone { op_id, rollback } => {
                assert_eq!(op_id, plan.op_id);
                assert!(rollback.complete);
            }
            UndoResult::NothingToUndo => panic!("expected undo"),
        }
        assert!(root.join("src/com/x/a/A.kt").is_file());
        assert!(!root.join("src/a").exists());

        assert!(matches!(
            executor.undo_last().unwrap(),
            UndoResult::NothingToUndo
        ));
    }

    #[test]
    fn interrupted_operation_blocks_apply() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp.path());
        Journal::new("apply").write(&paths).unwrap();

        let result = Executor::new(temp.path()).execute(&plan(vec![]));
        assert!(matches!(
            result,
            Err(ExecuteError::OperationInProgress { .. })
        ));
    }

    #[test]
    fn undo_clears_interrupted_operation_already_restored() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let paths = ProjectPaths::new(root);
        write(root, "src/com/x/a/A.kt", "package com.x.a");

        let mut interrupted = Journal::new("apply");
        interrupted
            .append_file_moved(
                &paths,
                SourcePath::parse("src/com/x/a/A.kt").unwrap(),
                SourcePath::parse("src/a/A.kt").unwrap(),
            )
            .unwrap();

        let executor = Executor::new(root);
        match executor.undo_last().unwrap() {
            UndoResult::Undone { op_id, rollback } => {
                assert_eq!(op_id, interrupted.op_id);
                assert!(rollback.complete, "{:?}", rollback.failed);
            }
            UndoResult::NothingToUndo => panic!("expected undo"),
        }

        let journal = Journal::read(&paths, &interrupted.op_id).unwrap();
        assert_eq!(journal.phase, OpPhase::RolledBack);
        assert!(executor.execute(&plan(vec![])).unwrap().is_success());
    }

    #[test]
    fn execute_fails_when_locked() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp.path());
        let _held = ProjectLock::acquire(&paths).unwrap();

        let result = Executor::new(temp.path()).execute(&plan(vec![]));
        assert!(matches!(result, Err(ExecuteError::LockFailed(_))));
    }
}
