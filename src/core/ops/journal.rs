//! core::ops::journal
//!
//! Operation journaling for crash safety and undo.
//!
//! # Crash Safety Contract
//!
//! 1. **Per-step persistence:** Every `append_*` method writes to disk with
//!    fsync before returning. A crash at any point leaves the journal in a
//!    consistent state.
//!
//! 2. **Recoverability:** After a crash, `Journal::read()` returns the
//!    journal as it was after the last successful `append_*` call.
//!
//! 3. **Rollback support:** The journal records every file move and every
//!    directory created or removed, which is enough to restore the tree.
//!
//! # Storage
//!
//! - `<project>/.flatlayout/ops/<op_id>.json` - Journal files
//!
//! # Usage
//!
//! ```ignore
//! use flatlayout::core::ops::journal::Journal;
//! use flatlayout::core::paths::ProjectPaths;
//!
//! let paths = ProjectPaths::new("/project");
//! let mut journal = Journal::new("apply");
//! journal.write(&paths)?;
//!
//! journal.append_dir_created(&paths, "src/main/kotlin/foo")?;
//! journal.append_file_moved(&paths, from, to)?;
//!
//! journal.commit();
//! journal.write(&paths)?;
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::paths::ProjectPaths;
use crate::core::types::{SourcePath, UtcTimestamp};

/// Errors from journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// I/O error reading or writing journal files.
    #[error("journal i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("journal json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Journal file not found.
    #[error("journal not found: {0}")]
    NotFound(String),
}

/// Unique identifier for an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId(String);

impl OpId {
    /// Generate a new unique operation id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an OpId from an existing string.
    ///
    /// Used when reading journals from disk.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OpId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The current phase of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpPhase {
    /// Operation is in progress.
    InProgress,
    /// Operation completed successfully.
    Committed,
    /// Operation was rolled back.
    RolledBack,
}

impl OpPhase {
    /// Check if the operation is finished (committed or rolled back).
    pub fn is_finished(&self) -> bool {
        matches!(self, OpPhase::Committed | OpPhase::RolledBack)
    }
}

/// A single step in an operation journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalStep {
    /// Step kind with operation-specific data.
    pub kind: StepKind,
    /// Timestamp when step was recorded.
    pub timestamp: UtcTimestamp,
}

/// The kind of journal step.
///
/// Paths are project-relative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    /// A file was renamed from `from` to `to`.
    FileMoved {
        /// Location before the move.
        from: SourcePath,
        /// Location after the move.
        to: SourcePath,
    },

    /// A directory was created to hold a moved file.
    DirCreated {
        /// The created directory.
        path: PathBuf,
    },

    /// A directory left empty by the moves was removed.
    DirRemoved {
        /// The removed directory.
        path: PathBuf,
    },

    /// A checkpoint marker.
    Checkpoint {
        /// Checkpoint name for debugging/logging.
        name: String,
    },
}

/// An operation journal.
///
/// Records all filesystem changes made by an apply so that they can be
/// rolled back after a failure or by `undo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    /// Unique operation identifier.
    pub op_id: OpId,
    /// Command that started this operation.
    pub command: String,
    /// Digest of the plan being applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_digest: Option<String>,
    /// When the operation started.
    pub started_at: UtcTimestamp,
    /// When the operation finished (if finished).
    pub finished_at: Option<UtcTimestamp>,
    /// Current phase.
    pub phase: OpPhase,
    /// Steps recorded so far.
    pub steps: Vec<JournalStep>,
}

impl Journal {
    /// Create a new journal for an operation.
    pub fn new(command: impl Into<String>) -> Self {
        Self::with_op_id(OpId::new(), command)
    }

    /// Create a journal that reuses the op id of the plan it records.
    pub fn with_op_id(op_id: OpId, command: impl Into<String>) -> Self {
        Self {
            op_id,
            command: command.into(),
            plan_digest: None,
            started_at: UtcTimestamp::now(),
            finished_at: None,
            phase: OpPhase::InProgress,
            steps: vec![],
        }
    }

    fn push(&mut self, kind: StepKind) {
        self.steps.push(JournalStep {
            kind,
            timestamp: UtcTimestamp::now(),
        });
    }

    /// Append a file move and persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be written to disk.
    pub fn append_file_moved(
        &mut self,
        paths: &ProjectPaths,
        from: SourcePath,
        to: SourcePath,
    ) -> Result<(), JournalError> {
        self.push(StepKind::FileMoved { from, to });
        self.write(paths)
    }

    /// Append a directory creation and persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be written to disk.
    pub fn append_dir_created(
        &mut self,
        paths: &ProjectPaths,
        path: impl Into<PathBuf>,
    ) -> Result<(), JournalError> {
        self.push(StepKind::DirCreated { path: path.into() });
        self.write(paths)
    }

    /// Append a directory removal and persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be written to disk.
    pub fn append_dir_removed(
        &mut self,
        paths: &ProjectPaths,
        path: impl Into<PathBuf>,
    ) -> Result<(), JournalError> {
        self.push(StepKind::DirRemoved { path: path.into() });
        self.write(paths)
    }

    /// Append a checkpoint and persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be written to disk.
    pub fn append_checkpoint(
        &mut self,
        paths: &ProjectPaths,
        name: impl Into<String>,
    ) -> Result<(), JournalError> {
        self.push(StepKind::Checkpoint { name: name.into() });
        self.write(paths)
    }

    /// Number of files moved so far.
    pub fn moved_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.kind, StepKind::FileMoved { .. }))
            .count()
    }

    /// Mark the operation as committed.
    pub fn commit(&mut self) {
        self.phase = OpPhase::Committed;
        self.finished_at = Some(UtcTimestamp::now());
    }

    /// Mark the operation as rolled back.
    pub fn rollback(&mut self) {
        self.phase = OpPhase::RolledBack;
        self.finished_at = Some(UtcTimestamp::now());
    }

    /// Write the journal to disk with fsync.
    pub fn write(&self, paths: &ProjectPaths) -> Result<(), JournalError> {
        fs::create_dir_all(paths.ops_dir())?;

        let path = paths.journal_path(self.op_id.as_str());
        let content = serde_json::to_string_pretty(self)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        file.write_all(content.as_bytes())?;
        file.sync_all()?;

        Ok(())
    }

    /// Read a journal from disk.
    pub fn read(paths: &ProjectPaths, op_id: &OpId) -> Result<Self, JournalError> {
        let path = paths.journal_path(op_id.as_str());

        if !path.exists() {
            return Err(JournalError::NotFound(op_id.to_string()));
        }

        let content = fs::read_to_string(&path)?;
        let journal = serde_json::from_str(&content)?;
        Ok(journal)
    }

    /// Read every journal in the ops directory, oldest first.
    ///
    /// Unreadable journal files are skipped with a warning.
    pub fn list(paths: &ProjectPaths) -> Result<Vec<Self>, JournalError> {
        let dir = paths.ops_dir();
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut journals = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(JournalError::from)
                .and_then(|content| serde_json::from_str::<Journal>(&content).map_err(Into::into));
            match parsed {
                Ok(journal) => journals.push(journal),
                Err(e) => log::warn!("skipping unreadable journal {}: {}", path.display(), e),
            }
        }

        journals.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        Ok(journals)
    }

    /// The most recent committed journal, if any.
    pub fn latest_committed(paths: &ProjectPaths) -> Result<Option<Self>, JournalError> {
        Ok(Self::list(paths)?
            .into_iter()
            .rev()
            .find(|j| j.phase == OpPhase::Committed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sp(s: &str) -> SourcePath {
        SourcePath::parse(s).unwrap()
    }

    #[test]
    fn new_journal_in_progress() {
        let journal = Journal::new("apply");
        assert_eq!(journal.phase, OpPhase::InProgress);
        assert!(journal.steps.is_empty());
        assert!(!journal.phase.is_finished());
    }

    #[test]
    fn append_persists_immediately() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp.path());
        let mut journal = Journal::new("apply");

        journal
            .append_file_moved(&paths, sp("a/b/A.kt"), sp("A.kt"))
            .unwrap();

        let read = Journal::read(&paths, &journal.op_id).unwrap();
        assert_eq!(read.steps.len(), 1);
        assert_eq!(
            read.steps[0].kind,
            StepKind::FileMoved {
                from: sp("a/b/A.kt"),
                to: sp("A.kt"),
            }
        );
        assert_eq!(read.moved_count(), 1);
    }

    #[test]
    fn read_missing_journal() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp.path());
        let err = Journal::read(&paths, &OpId::from_string("nope")).unwrap_err();
        assert!(matches!(err, JournalError::NotFound(_)));
    }

    #[test]
    fn commit_and_rollback_set_finished() {
        let mut journal = Journal::new("apply");
        journal.commit();
        assert_eq!(journal.phase, OpPhase::Committed);
        assert!(journal.finished_at.is_some());

        journal.rollback();
        assert_eq!(journal.phase, OpPhase::RolledBack);
    }

    #[test]
    fn latest_committed_skips_rolled_back() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp.path());

        let mut first = Journal::new("apply");
        first.commit();
        first.write(&paths).unwrap();

        let mut second = Journal::new("apply");
        second.started_at = UtcTimestamp::from_datetime(
            *first.started_at.as_datetime() + chrono::Duration::seconds(1),
        );
        second.rollback();
        second.write(&paths).unwrap();

        let latest = Journal::latest_committed(&paths).unwrap().unwrap();
        assert_eq!(latest.op_id, first.op_id);
    }

    #[test]
    fn list_skips_garbage() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp.path());
        fs::create_dir_all(paths.ops_dir()).unwrap();
        fs::write(paths.ops_dir().join("broken.json"), "{").unwrap();
        fs::write(paths.ops_dir().join("notes.txt"), "hi").unwrap();

        Journal::new("apply").write(&paths).unwrap();

        assert_eq!(Journal::list(&paths).unwrap().len(), 1);
    }

    #[test]
    fn step_serialization_is_tagged() {
        let step = StepKind::DirCreated {
            path: PathBuf::from("src/main/kotlin/foo"),
        };
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"type\":\"dir_created\""));
    }
}
