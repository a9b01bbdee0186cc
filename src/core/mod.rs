//! core
//!
//! Core domain types, the flattening algorithm, and supporting storage.
//!
//! # Modules
//!
//! - [`types`] - Strong types: NamespacePath, RootPrefix, SourcePath, etc.
//! - [`prefix`] - Root prefix discovery (longest common namespace prefix)
//! - [`rewrite`] - Per-file path rewriting against a root prefix
//! - [`declaration`] - Reading `package` declarations from source headers
//! - [`config`] - Configuration schema and loading
//! - [`ops`] - Operation journaling and locking
//! - [`paths`] - Centralized path routing for flatlayout storage
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Discovery and rewriting are pure and perform no I/O
//! - Rewriting is total: every input has a defined outcome

pub mod config;
pub mod declaration;
pub mod ops;
pub mod paths;
pub mod prefix;
pub mod rewrite;
pub mod types;
