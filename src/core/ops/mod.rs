//! core::ops
//!
//! Operation journaling and locking.
//!
//! # Modules
//!
//! - [`journal`] - Operation journal for crash safety and undo
//! - [`lock`] - Exclusive project lock
//!
//! # Architecture
//!
//! Every mutating command:
//! 1. Acquires the exclusive project lock
//! 2. Creates an operation journal before the first move
//! 3. Records each file move and directory change as it happens
//! 4. On success: marks journal committed
//! 5. On failure: uses journal for rollback
//!
//! # Example
//!
//! ```ignore
//! use flatlayout::core::ops::{Journal, ProjectLock};
//! use flatlayout::core::paths::ProjectPaths;
//!
//! let paths = ProjectPaths::new(root);
//! let _lock = ProjectLock::acquire(&paths)?;
//!
//! let mut journal = Journal::new("apply");
//! journal.write(&paths)?;
//! journal.append_file_moved(&paths, from, to)?;
//!
//! journal.commit();
//! journal.write(&paths)?;
//! ```

pub mod journal;
pub mod lock;

pub use journal::{Journal, JournalError, OpId, OpPhase, StepKind};
pub use lock::{LockError, ProjectLock};
