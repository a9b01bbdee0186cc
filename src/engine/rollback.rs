//! engine::rollback
//!
//! Reverse a journaled operation.
//!
//! # Architecture
//!
//! Rollback walks a journal's steps in reverse and undoes each one:
//!
//! - `FileMoved` moves the file back, recreating parent directories
//! - `DirCreated` removes the directory if it is still empty
//! - `DirRemoved` recreates the directory
//!
//! Rollback never overwrites. If a moved file is gone or its original
//! location is occupied, that step is reported as failed and the
//! remaining steps are still attempted.
//!
//! Replaying a journal is idempotent: a file already back at its original
//! location, a created directory already gone, and a removed directory
//! already present all count as undone. A partial rollback can therefore
//! be retried after the conflicting paths are fixed.
//!
//! # Invariants
//!
//! - Caller holds the project lock
//! - A complete rollback restores every recorded location

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::ops::journal::{Journal, StepKind};

/// Why a single step could not be undone.
#[derive(Debug, Error)]
pub enum RollbackError {
    /// The filesystem no longer matches what the journal recorded.
    #[error("{path}: {reason}")]
    Conflict {
        /// Path that blocked the step.
        path: PathBuf,
        /// What was found there.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("{path}: {source}")]
    Io {
        /// Path being restored.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result of a rollback.
#[derive(Debug, Default)]
pub struct RollbackResult {
    /// Descriptions of steps that were undone.
    pub rolled_back: Vec<String>,
    /// Steps that could not be undone.
    pub failed: Vec<(String, RollbackError)>,
    /// Whether every step was undone.
    pub complete: bool,
}

impl RollbackResult {
    /// Number of files moved back to their original location.
    pub fn restored_files(&self) -> usize {
        self.rolled_back
            .iter()
            .filter(|d| d.starts_with("restore "))
            .count()
    }
}

/// Undo every step recorded in `journal` under `root`.
pub fn rollback_journal(root: &Path, journal: &Journal) -> RollbackResult {
    let mut result = RollbackResult::default();

    for step in journal.steps.iter().rev() {
        let outcome = match &step.kind {
            StepKind::FileMoved { from, to } => {
                let description = format!("restore {} -> {}", to, from);
                (description, restore_file(&to.under(root), &from.under(root)))
            }
            StepKind::DirCreated { path } => {
                let description = format!("remove created directory {}", path.display());
                (description, remove_created_dir(&root.join(path)))
            }
            StepKind::DirRemoved { path } => {
                let description = format!("recreate directory {}", path.display());
                let abs = root.join(path);
                let restored = fs::create_dir_all(&abs).map_err(|source| RollbackError::Io {
                    path: abs,
                    source,
                });
                (description, restored)
            }
            StepKind::Checkpoint { .. } => continue,
        };

        match outcome {
            (description, Ok(())) => {
                log::debug!("rollback: {}", description);
                result.rolled_back.push(description);
            }
            (description, Err(e)) => {
                log::warn!("rollback failed: {}: {}", description, e);
                result.failed.push((description, e));
            }
        }
    }

    result.complete = result.failed.is_empty();
    result
}

fn restore_file(current: &Path, original: &Path) -> Result<(), RollbackError> {
    if !current.exists() && original.is_file() {
        log::debug!("{} is already restored", original.display());
        return Ok(());
    }
    if !current.is_file() {
        return Err(RollbackError::Conflict {
            path: current.to_path_buf(),
            reason: "moved file is missing".to_string(),
        });
    }
    if original.symlink_metadata().is_ok() {
        return Err(RollbackError::Conflict {
            path: original.to_path_buf(),
            reason: "original location is occupied".to_string(),
        });
    }
    if let Some(parent) = original.parent() {
        fs::create_dir_all(parent).map_err(|source| RollbackError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::rename(current, original).map_err(|source| RollbackError::Io {
        path: current.to_path_buf(),
        source,
    })
}

fn remove_created_dir(dir: &Path) -> Result<(), RollbackError> {
    let mut entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(RollbackError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };
    if entries.next().is_some() {
        return Err(RollbackError::Conflict {
            path: dir.to_path_buf(),
            reason: "directory is not empty".to_string(),
        });
    }
    fs::remove_dir(dir).map_err(|source| RollbackError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
