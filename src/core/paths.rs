//! core::paths
//!
//! Centralized path routing for flatlayout storage locations.
//!
//! # Storage Layout
//!
//! All flatlayout data is stored under `<project>/.flatlayout/`:
//! - `config.toml` - Project configuration
//! - `lock` - Exclusive lock file
//! - `ops/` - Operation journals
//!
//! The scanner never descends into this directory.
//!
//! # Example
//!
//! ```
//! use flatlayout::core::paths::ProjectPaths;
//! use std::path::PathBuf;
//!
//! let paths = ProjectPaths::new("/project");
//!
//! assert_eq!(
//!     paths.config_path(),
//!     PathBuf::from("/project/.flatlayout/config.toml")
//! );
//! ```

use std::path::{Path, PathBuf};

/// Name of the storage directory inside a project.
pub const STORAGE_DIR: &str = ".flatlayout";

/// Centralized path routing for flatlayout storage.
///
/// No code outside this module should compute `*.join(".flatlayout")` paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// The project root.
    pub root: PathBuf,
}

impl ProjectPaths {
    /// Create paths for the project rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Base storage directory: `<root>/.flatlayout`.
    pub fn storage_dir(&self) -> PathBuf {
        self.root.join(STORAGE_DIR)
    }

    /// Canonical project config: `<root>/.flatlayout/config.toml`.
    pub fn config_path(&self) -> PathBuf {
        self.storage_dir().join("config.toml")
    }

    /// Compatibility project config: `<root>/flatlayout.toml`.
    pub fn compat_config_path(&self) -> PathBuf {
        self.root.join("flatlayout.toml")
    }

    /// Lock file: `<root>/.flatlayout/lock`.
    pub fn lock_path(&self) -> PathBuf {
        self.storage_dir().join("lock")
    }

    /// Journal directory: `<root>/.flatlayout/ops`.
    pub fn ops_dir(&self) -> PathBuf {
        self.storage_dir().join("ops")
    }

    /// Journal file for an operation: `<root>/.flatlayout/ops/<op_id>.json`.
    pub fn journal_path(&self, op_id: &str) -> PathBuf {
        self.ops_dir().join(format!("{}.json", op_id))
    }

    /// Whether `path` (absolute, under the root) lies inside the storage dir.
    pub fn is_storage(&self, path: &Path) -> bool {
        path.strip_prefix(&self.root)
            .ok()
            .and_then(|rel| rel.components().next())
            .is_some_and(|first| first.as_os_str() == STORAGE_DIR)
    }
}
