//! engine::plan
//!
//! Deterministic flatten plans.
//!
//! # Architecture
//!
//! Plans are the sole intermediate representation between a scanned
//! snapshot and filesystem mutation. They are:
//! - **Deterministic**: the same snapshot and settings give the same steps
//! - **Previewable**: shown to the user before anything moves
//! - **Serializable**: printed by `flat plan --json` and digested into journals
//!
//! # Invariants
//!
//! - Planning performs no I/O
//! - Every `MoveFile` source is a scanned record and every destination
//!   is derived by the path rewriter
//! - `PruneEmptyDirs`, when present, is the last step
//!
//! # Example
//!
//! ```
//! use flatlayout::core::ops::journal::OpId;
//! use flatlayout::core::types::{BaseDir, NamespacePath, RootPrefix, SourcePath};
//! use flatlayout::engine::plan::{Plan, PlanStep, RootSource};
//!
//! let root = RootPrefix::from(NamespacePath::parse("com.example", '.').unwrap());
//! let plan = Plan::new(
//!     OpId::new(),
//!     "apply",
//!     root,
//!     RootSource::Discovered,
//!     BaseDir::parse("src/main/kotlin").unwrap(),
//! )
//! .with_step(PlanStep::MoveFile {
//!     from: SourcePath::parse("src/main/kotlin/com/example/a/A.kt").unwrap(),
//!     to: SourcePath::parse("src/main/kotlin/a/A.kt").unwrap(),
//!     namespace: NamespacePath::parse("com.example.a", '.').unwrap(),
//! });
//!
//! assert!(!plan.is_empty());
//! assert_eq!(plan.move_count(), 1);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::ops::journal::OpId;
use crate::core::rewrite::KeepReason;
use crate::core::types::{BaseDir, NamespacePath, RootPrefix, SourcePath};

/// A typed plan step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanStep {
    /// Move a file to its flattened location.
    ///
    /// The executor only performs the move if `from` exists and `to`
    /// does not.
    MoveFile {
        /// Current location.
        from: SourcePath,
        /// Flattened location.
        to: SourcePath,
        /// Namespace the file declares.
        namespace: NamespacePath,
    },

    /// Remove directories (and their ancestors) left empty by the moves.
    PruneEmptyDirs {
        /// Project-relative directories vacated by `MoveFile` steps.
        dirs: Vec<PathBuf>,
    },
}

impl PlanStep {
    /// Whether this step moves a file.
    pub fn is_move(&self) -> bool {
        matches!(self, PlanStep::MoveFile { .. })
    }

    /// Human-readable description.
    pub fn description(&self) -> String {
        match self {
            PlanStep::MoveFile { from, to, .. } => format!("move {} -> {}", from, to),
            PlanStep::PruneEmptyDirs { dirs } => {
                format!("prune empty directories under {} vacated location(s)", dirs.len())
            }
        }
    }
}

/// A file the plan leaves where it is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedFile {
    /// The file's location.
    pub path: SourcePath,
    /// Why it stays.
    pub reason: KeepReason,
}

/// Where the root prefix of a plan came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RootSource {
    /// Supplied by `--root` or `root_package`.
    Configured,
    /// Computed as the longest common prefix of all declarations.
    Discovered,
}

impl std::fmt::Display for RootSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootSource::Configured => write!(f, "configured"),
            RootSource::Discovered => write!(f, "discovered"),
        }
    }
}

/// A flatten plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Operation id, reused by the journal.
    pub op_id: OpId,
    /// Command that produced the plan.
    pub command: String,
    /// Root prefix stripped from every namespace.
    pub root: RootPrefix,
    /// Where `root` came from.
    pub root_source: RootSource,
    /// Directory files are placed under.
    pub base_dir: BaseDir,
    /// Steps in execution order.
    pub steps: Vec<PlanStep>,
    /// Files left in place, with reasons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
}

impl Plan {
    /// Create an empty plan.
    pub fn new(
        op_id: OpId,
        command: impl Into<String>,
        root: RootPrefix,
        root_source: RootSource,
        base_dir: BaseDir,
    ) -> Self {
        Self {
            op_id,
            command: command.into(),
            root,
            root_source,
            base_dir,
            steps: vec![],
            skipped: vec![],
        }
    }

    /// Add a step.
    pub fn with_step(mut self, step: PlanStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Add several steps.
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = PlanStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Record a file the plan leaves alone.
    pub fn with_skipped(mut self, path: SourcePath, reason: KeepReason) -> Self {
        self.skipped.push(SkippedFile { path, reason });
        self
    }

    /// Stable digest of the plan contents.
    ///
    /// Format: `sha256:<hex>` over the plan's JSON encoding.
    pub fn digest(&self) -> String {
        let json = serde_json::to_string(&self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }

    /// Check if the plan moves nothing.
    pub fn is_empty(&self) -> bool {
        self.move_count() == 0
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Number of file moves.
    pub fn move_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_move()).count()
    }

    /// Iterate over the `(from, to)` pairs of all moves.
    pub fn moves(&self) -> impl Iterator<Item = (&SourcePath, &SourcePath)> {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::MoveFile { from, to, .. } => Some((from, to)),
            PlanStep::PruneEmptyDirs { .. } => None,
        })
    }

    /// Destinations claimed by more than one move.
    ///
    /// The executor refuses to overwrite, so the second move onto a shared
    /// destination would abort the apply.
    pub fn collisions(&self) -> Vec<&SourcePath> {
        let mut seen = std::collections::BTreeMap::new();
        for (_, to) in self.moves() {
            *seen.entry(to).or_insert(0usize) += 1;
        }
        seen.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(to, _)| to)
            .collect()
    }

    /// Generate a human-readable preview.
    pub fn preview(&self) -> String {
        if self.is_empty() {
            return format!("{}: No changes needed", self.command);
        }

        let mut lines = vec![format!("{}:", self.command)];
        for (i, step) in self.steps.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, step.description()));
        }
        lines.join("\n")
    }
}

impl PartialEq for Plan {
    fn eq(&self, other: &Self) -> bool {
        self.op_id == other.op_id && self.command == other.command && self.steps == other.steps
    }
}
