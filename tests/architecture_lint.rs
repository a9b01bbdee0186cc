//! Architecture enforcement tests.
//!
//! Source files may only be moved by the journaled executor. These tests
//! scan the crate's sources and fail when a filesystem mutation shows up
//! outside the modules that own it.
//!
//! # Test Categories
//!
//! 1. **Move Ownership** - Only exec and rollback rename or remove paths
//! 2. **Thin CLI** - Command handlers and UI never touch `std::fs`
//! 3. **Pure Planning** - Planning and discovery modules never touch `std::fs`

use std::fs;
use std::path::{Path, PathBuf};

/// Calls that rename or delete paths in the project tree.
const MOVE_PATTERNS: &[&str] = &["fs::rename(", "fs::remove_dir(", "fs::remove_file("];

/// Modules allowed to rename or remove paths.
///
/// - `engine/exec.rs` - applies plan steps
/// - `engine/rollback.rs` - reverses journaled steps
/// - `core/config/mod.rs` - atomic config writes (temp file + rename)
const MOVE_OWNERS: &[&str] = &["engine/exec.rs", "engine/rollback.rs", "core/config/mod.rs"];

/// Modules that must stay free of any `std::fs` use.
const FS_FREE: &[&str] = &[
    "cli",
    "ui",
    "engine/plan.rs",
    "engine/flatten.rs",
    "core/prefix.rs",
    "core/rewrite.rs",
    "core/declaration.rs",
];

fn src_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).expect("failed to read src dir") {
        let path = entry.expect("bad dir entry").path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    files.sort();
    files
}

/// Source relative to `src/`, using `/` separators.
fn relative(path: &Path) -> String {
    path.strip_prefix(src_dir())
        .expect("file outside src")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// File contents with the `#[cfg(test)]` module cut off.
fn production_code(path: &Path) -> String {
    let content = fs::read_to_string(path).expect("failed to read source file");
    match content.find("#[cfg(test)]") {
        Some(idx) => content[..idx].to_string(),
        None => content,
    }
}

fn matches_scope(rel: &str, scope: &str) -> bool {
    rel == scope || rel.starts_with(&format!("{}/", scope))
}

#[test]
fn only_owners_move_or_remove_paths() {
    let mut violations = Vec::new();

    for path in rust_files(&src_dir()) {
        let rel = relative(&path);
        if MOVE_OWNERS.contains(&rel.as_str()) {
            continue;
        }
        let code = production_code(&path);
        for pattern in MOVE_PATTERNS {
            if code.contains(pattern) {
                violations.push(format!("{} calls {}", rel, pattern));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Filesystem mutations outside the executor:\n  {}",
        violations.join("\n  ")
    );
}

#[test]
fn cli_ui_and_planning_do_not_touch_fs() {
    let mut violations = Vec::new();

    for path in rust_files(&src_dir()) {
        let rel = relative(&path);
        if !FS_FREE.iter().any(|scope| matches_scope(&rel, scope)) {
            continue;
        }
        let code = production_code(&path);
        if code.contains("std::fs") || code.contains("fs::") {
            violations.push(rel);
        }
    }

    assert!(
        violations.is_empty(),
        "Modules expected to be filesystem-free use std::fs:\n  {}",
        violations.join("\n  ")
    );
}

#[test]
fn move_owners_exist() {
    for owner in MOVE_OWNERS {
        assert!(
            src_dir().join(owner).exists(),
            "{} is listed as a move owner but does not exist",
            owner
        );
    }
}
