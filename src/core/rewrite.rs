//! core::rewrite
//!
//! Per-file path rewriting.
//!
//! # Overview
//!
//! Given a record, the frozen [`RootPrefix`] and the [`BaseDir`], compute
//! where the file belongs once the root is stripped:
//!
//! ```text
//! namespace  ch.frankel.blog.bar      root  ch.frankel.blog
//! path       src/main/kotlin/ch/frankel/blog/bar/Bar.kt
//!         => src/main/kotlin/bar/Bar.kt
//! ```
//!
//! Rewriting is total. Records without a namespace, an empty root, and
//! namespaces outside the root all leave the record where it is.
//!
//! Only the namespace and filename determine the destination, so
//! rewriting an already rewritten record yields the same record again.

use serde::{Deserialize, Serialize};

use super::types::{BaseDir, FileRecord, RootPrefix, SourcePath};

/// Why a record keeps its current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepReason {
    /// The file declares no namespace.
    NoNamespace,
    /// The root prefix is empty; there is nothing to strip.
    EmptyRoot,
    /// The namespace does not start with the root prefix.
    OutsideRoot,
    /// The computed destination equals the current location.
    AlreadyInPlace,
}

impl KeepReason {
    /// Short human-readable explanation.
    pub fn describe(&self) -> &'static str {
        match self {
            KeepReason::NoNamespace => "no namespace declaration",
            KeepReason::EmptyRoot => "no common root package",
            KeepReason::OutsideRoot => "namespace outside root package",
            KeepReason::AlreadyInPlace => "already in place",
        }
    }
}

impl std::fmt::Display for KeepReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Outcome of rewriting a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// The record stays where it is.
    Keep(KeepReason),
    /// The record belongs at a new location.
    Relocate(SourcePath),
}

/// Compute the outcome for `record` without building a new record.
pub fn classify(record: &FileRecord, root: &RootPrefix, base: &BaseDir) -> Rewrite {
    let Some(namespace) = &record.namespace else {
        return Rewrite::Keep(KeepReason::NoNamespace);
    };
    if root.is_empty() {
        return Rewrite::Keep(KeepReason::EmptyRoot);
    }
    let Some(remainder) = namespace.strip_prefix(root.as_namespace()) else {
        return Rewrite::Keep(KeepReason::OutsideRoot);
    };

    let destination = base.place(remainder, record.path.file_name());
    if destination == record.path {
        Rewrite::Keep(KeepReason::AlreadyInPlace)
    } else {
        Rewrite::Relocate(destination)
    }
}

/// Rewrite `record` into a new record at its flattened location.
///
/// The input is never modified; unchanged outcomes return a copy.
pub fn rewrite(record: &FileRecord, root: &RootPrefix, base: &BaseDir) -> FileRecord {
    match classify(record, root, base) {
        Rewrite::Relocate(path) => record.with_path(path),
        Rewrite::Keep(_) => record.clone(),
    }
}
