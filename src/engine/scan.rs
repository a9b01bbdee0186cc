//! engine::scan
//!
//! Project scanning.
//!
//! # Architecture
//!
//! The scanner walks the project tree and produces a [`ProjectSnapshot`]:
//! one [`FileRecord`] per source file, pairing its project-relative
//! location with the namespace it declares (if any).
//!
//! Only the source directory is walked (the base directory when driven by
//! the engine), so sibling source sets such as `src/test/kotlin` and other
//! modules' trees are never picked up. The walk honors `.gitignore` /
//! `.ignore` files, including those above the source directory, skips
//! hidden entries (including the `.flatlayout` storage directory), and
//! skips build output directories at the project root.
//!
//! # Invariants
//!
//! - Scan is read-only; it never mutates the project
//! - Records are sorted by path, so scanning is deterministic
//! - A file that cannot be read as UTF-8 is recorded without a namespace

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

use crate::core::declaration::read_namespace;
use crate::core::paths::ProjectPaths;
use crate::core::types::{BaseDir, FileRecord, SourcePath};

/// Build output directories skipped when they sit directly under the project root.
///
/// Nested module outputs are expected to be covered by `.gitignore`.
const IGNORED_TOP_LEVEL: &[&str] = &["build", "target", "out"];

/// Errors from scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The project root is missing or not a directory.
    #[error("project root is not a directory: {0}")]
    InvalidRoot(PathBuf),

    /// The project root could not be resolved.
    #[error("failed to resolve project root: {0}")]
    Io(#[from] std::io::Error),
}

/// What to scan for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// File extensions (without the dot) that carry declarations.
    pub extensions: Vec<String>,
    /// Namespace delimiter used when parsing declarations.
    pub delimiter: char,
    /// Directory to walk, relative to the project root.
    pub source_dir: BaseDir,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["kt".to_string(), "kts".to_string()],
            delimiter: '.',
            source_dir: BaseDir::project_root(),
        }
    }
}

impl ScanOptions {
    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// The scanned state of a project.
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    /// Canonical project root.
    pub root: PathBuf,
    /// One record per matching file, sorted by path.
    pub records: Vec<FileRecord>,
}

impl ProjectSnapshot {
    /// Number of records that declare a namespace.
    pub fn declared_count(&self) -> usize {
        self.records.iter().filter(|r| r.namespace.is_some()).count()
    }
}

/// Scan the project rooted at `root`.
///
/// # Errors
///
/// Returns [`ScanError::InvalidRoot`] if `root` is not a directory.
/// A missing source directory yields an empty snapshot. Unreadable entries
/// are logged and skipped rather than failing the scan.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ProjectSnapshot, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidRoot(root.to_path_buf()));
    }
    let root = root.canonicalize()?;
    let paths = ProjectPaths::new(&root);

    let source_dir = root.join(options.source_dir.to_path_buf());
    if !source_dir.is_dir() {
        log::warn!(
            "source directory {} does not exist; nothing to scan",
            options.source_dir
        );
        return Ok(ProjectSnapshot {
            root,
            records: Vec::new(),
        });
    }

    let mut builder = WalkBuilder::new(&source_dir);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true);
    let project_root = root.clone();
    builder.filter_entry(move |entry| !is_build_output(entry, &project_root));

    let mut records = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("failed to read entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        if paths.is_storage(path) || !options.matches(path) {
            continue;
        }

        let Ok(relative) = path.strip_prefix(&root) else {
            continue;
        };
        let source = match SourcePath::from_relative(relative) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let namespace = match fs::read_to_string(path) {
            Ok(content) => read_namespace(&content, options.delimiter),
            Err(e) => {
                log::warn!("cannot read {}: {}", path.display(), e);
                None
            }
        };
        if namespace.is_none() {
            log::debug!("{} declares no namespace", source);
        }

        records.push(FileRecord::new(namespace, source));
    }

    records.sort_by(|a, b| a.path.cmp(&b.path));
    log::info!(
        "scanned {} source files under {}",
        records.len(),
        source_dir.display()
    );

    Ok(ProjectSnapshot { root, records })
}

/// A build output directory directly under the project root.
fn is_build_output(entry: &ignore::DirEntry, project_root: &Path) -> bool {
    entry.path().parent() == Some(project_root)
        && entry.file_type().is_some_and(|t| t.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_TOP_LEVEL.contains(&name))
}
