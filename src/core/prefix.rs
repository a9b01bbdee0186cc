//! core::prefix
//!
//! Root prefix discovery.
//!
//! # Overview
//!
//! When no root package is configured, the root is the longest segment
//! prefix shared by every file that declares a namespace. Discovery is a
//! fold over the project's records into a [`PrefixAccumulator`]; the
//! accumulator's [`result`](PrefixAccumulator::result) is frozen into a
//! [`RootPrefix`] and handed to the rewrite pass.
//!
//! # Invariants
//!
//! - Files without a namespace do not narrow the prefix
//! - The result is a segment prefix of every observed namespace, and no
//!   longer prefix has that property
//! - The result does not depend on observation order or on how the input
//!   is partitioned before [`merge`](PrefixAccumulator::merge)
//! - Once the prefix is empty it stays empty
//!
//! # Example
//!
//! ```
//! use flatlayout::core::prefix::PrefixAccumulator;
//! use flatlayout::core::types::NamespacePath;
//!
//! let mut acc = PrefixAccumulator::new();
//! acc.observe(&NamespacePath::parse("ch.frankel.blog.foo", '.').unwrap());
//! acc.observe(&NamespacePath::parse("ch.frankel.blog.bar", '.').unwrap());
//!
//! assert_eq!(acc.result().to_string(), "ch.frankel.blog");
//! ```

use super::types::{FileRecord, NamespacePath, RootPrefix};

/// Running longest-common-prefix over observed namespace paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixAccumulator {
    accumulated: Option<NamespacePath>,
}

impl PrefixAccumulator {
    /// An accumulator that has observed nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow the prefix with one more namespace path.
    ///
    /// The first observation establishes the baseline; later observations
    /// can only shorten it.
    pub fn observe(&mut self, path: &NamespacePath) {
        match &self.accumulated {
            None => self.accumulated = Some(path.clone()),
            Some(current) if current.is_empty() => {}
            Some(current) => {
                let shared = current.common_prefix(path);
                if shared.len() < current.len() {
                    log::debug!("root prefix narrowed from '{current}' to '{shared}' by '{path}'");
                }
                self.accumulated = Some(shared);
            }
        }
    }

    /// Observe a record's namespace; records without one are ignored.
    pub fn observe_record(&mut self, record: &FileRecord) {
        if let Some(namespace) = &record.namespace {
            self.observe(namespace);
        }
    }

    /// Combine two partial accumulators.
    ///
    /// An accumulator that observed nothing is the identity.
    pub fn merge(self, other: Self) -> Self {
        match (self.accumulated, other.accumulated) {
            (None, rhs) => Self { accumulated: rhs },
            (lhs, None) => Self { accumulated: lhs },
            (Some(lhs), Some(rhs)) => Self {
                accumulated: Some(lhs.common_prefix(&rhs)),
            },
        }
    }

    /// Whether any namespace has been observed.
    pub fn has_observed(&self) -> bool {
        self.accumulated.is_some()
    }

    /// Whether the prefix has collapsed to empty.
    ///
    /// No further observation can change a frozen accumulator.
    pub fn is_frozen(&self) -> bool {
        self.accumulated.as_ref().is_some_and(NamespacePath::is_empty)
    }

    /// The common prefix so far; empty if nothing was observed.
    pub fn result(&self) -> RootPrefix {
        self.accumulated.clone().unwrap_or_default().into()
    }
}

impl<'a> Extend<&'a NamespacePath> for PrefixAccumulator {
    fn extend<I: IntoIterator<Item = &'a NamespacePath>>(&mut self, iter: I) {
        for path in iter {
            if self.is_frozen() {
                break;
            }
            self.observe(path);
        }
    }
}

impl<'a> FromIterator<&'a NamespacePath> for PrefixAccumulator {
    fn from_iter<I: IntoIterator<Item = &'a NamespacePath>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

/// Discover the root prefix shared by all records that declare a namespace.
pub fn discover_root<'a>(records: impl IntoIterator<Item = &'a FileRecord>) -> RootPrefix {
    let mut acc = PrefixAccumulator::new();
    for record in records {
        if acc.is_frozen() {
            break;
        }
        acc.observe_record(record);
    }
    acc.result()
}

/// The root the rewrite pass should use.
///
/// An explicitly configured root bypasses discovery entirely.
pub fn effective_root<'a>(
    configured: Option<&RootPrefix>,
    records: impl IntoIterator<Item = &'a FileRecord>,
) -> RootPrefix {
    match configured {
        Some(root) => root.clone(),
        None => discover_root(records),
    }
}
