//! flatlayout - Flatten redundant package directories in JVM source trees
//!
//! Kotlin allows a file's directory to differ from its package. Projects
//! that mirror every package segment end up with chains such as
//! `src/main/kotlin/ch/frankel/blog/...` where `ch/frankel/blog` is shared
//! by every file. flatlayout discovers that shared root package and moves
//! each file so its directory mirrors only the part of the package below
//! the root.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Scan → Plan → Execute
//! - [`core`] - Domain types, root discovery, path rewriting, config, journals
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! flatlayout maintains the following invariants:
//!
//! 1. The root prefix is frozen before any file is rewritten
//! 2. All moves flow through a single journaled executor
//! 3. Existing files are never overwritten
//! 4. Every apply can be reverted with `flat undo`

pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
