//! engine::flatten
//!
//! Turns a scanned snapshot into a flatten [`Plan`].
//!
//! # Architecture
//!
//! Planning runs in two passes over the records:
//!
//! 1. Determine the root prefix. A configured root is used as-is;
//!    otherwise the longest common prefix of every declared namespace
//!    is discovered.
//! 2. Classify every record against that frozen root. Relocations become
//!    `MoveFile` steps; everything else is listed as skipped.
//!
//! Both passes are pure, so `flat plan` and `flat apply` agree on what
//! would happen.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::core::ops::journal::OpId;
use crate::core::prefix::effective_root;
use crate::core::rewrite::{classify, Rewrite};
use crate::core::types::{BaseDir, FileRecord, RootPrefix};

use super::plan::{Plan, PlanStep, RootSource};

/// Inputs to planning besides the records themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenSettings {
    /// Explicit root prefix; `None` means discover it.
    pub root: Option<RootPrefix>,
    /// Directory flattened files are placed under.
    pub base_dir: BaseDir,
    /// Whether to append a `PruneEmptyDirs` step.
    pub prune_empty_dirs: bool,
}

impl FlattenSettings {
    /// Settings that discover the root and prune emptied directories.
    pub fn discover(base_dir: BaseDir) -> Self {
        Self {
            root: None,
            base_dir,
            prune_empty_dirs: true,
        }
    }

    /// Use an explicit root instead of discovering one.
    pub fn with_root(mut self, root: RootPrefix) -> Self {
        self.root = Some(root);
        self
    }

    /// Toggle the prune step.
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune_empty_dirs = prune;
        self
    }

    fn root_source(&self) -> RootSource {
        if self.root.is_some() {
            RootSource::Configured
        } else {
            RootSource::Discovered
        }
    }
}

/// Build a flatten plan for `records`.
///
/// Records are expected in scan order; moves appear in the same order.
pub fn plan_flatten(records: &[FileRecord], settings: &FlattenSettings) -> Plan {
    let root = effective_root(settings.root.as_ref(), records);
    log::debug!("flattening with {} root '{}'", settings.root_source(), root);

    let mut plan = Plan::new(
        OpId::new(),
        "apply",
        root.clone(),
        settings.root_source(),
        settings.base_dir.clone(),
    );

    let mut vacated: BTreeSet<PathBuf> = BTreeSet::new();
    for record in records {
        match classify(record, &root, &settings.base_dir) {
            Rewrite::Relocate(to) => {
                let parent = record.path.parent();
                if parent.components().next().is_some() {
                    vacated.insert(parent);
                }
                // classify only relocates records that declare a namespace
                let Some(namespace) = record.namespace.clone() else {
                    continue;
                };
                plan = plan.with_step(PlanStep::MoveFile {
                    from: record.path.clone(),
                    to,
                    namespace,
                });
            }
            Rewrite::Keep(reason) => {
                log::debug!("keeping {}: {}", record.path, reason);
                plan = plan.with_skipped(record.path.clone(), reason);
            }
        }
    }

    if settings.prune_empty_dirs && !vacated.is_empty() {
        plan = plan.with_step(PlanStep::PruneEmptyDirs {
            dirs: vacated.into_iter().collect(),
        });
    }

    let collisions = plan.collisions();
    if !collisions.is_empty() {
        log::warn!(
            "{} destination(s) are claimed by more than one file; apply will stop at the first",
            collisions.len()
        );
    }

    plan
}
