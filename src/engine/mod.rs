//! engine
//!
//! Orchestrates the command lifecycle: Scan -> Plan -> Execute.
//!
//! # Architecture
//!
//! The engine is the central coordinator for flatlayout commands:
//!
//! 1. **Scan**: Walk the project and read each file's namespace declaration
//! 2. **Plan**: Determine the root prefix and compute a deterministic plan
//! 3. **Execute**: Apply the plan through the single transactional executor
//!
//! `flat root` and `flat plan` stop after step 2; `flat apply` runs all
//! three. `flat undo` goes straight to the executor.
//!
//! # Invariants
//!
//! - The engine never performs mutations directly; all flow through the Executor
//! - Configuration precedence is CLI flag > project config > global config > preset
//!
//! # Example
//!
//! ```ignore
//! use flatlayout::engine::{prepare, Context, Executor, FlattenOverrides};
//!
//! let ctx = Context::default();
//! let prepared = prepare(&ctx, &FlattenOverrides::default())?;
//! println!("{}", prepared.plan.preview());
//! let result = Executor::new(&prepared.snapshot.root).execute(&prepared.plan)?;
//! ```

pub mod exec;
pub mod flatten;
pub mod plan;
pub mod rollback;
pub mod scan;

pub use exec::{ExecuteError, ExecuteResult, Executor, UndoResult};
pub use flatten::{plan_flatten, FlattenSettings};
pub use plan::{Plan, PlanStep, RootSource, SkippedFile};
pub use rollback::{rollback_journal, RollbackError, RollbackResult};
pub use scan::{scan, ProjectSnapshot, ScanError, ScanOptions};

use std::path::PathBuf;

use crate::core::config::schema::Language;
use crate::core::config::{Config, ConfigError};
use crate::core::types::{BaseDir, NamespacePath, RootPrefix};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}

impl Context {
    /// The project root: `--cwd` if given, else the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist.
    pub fn project_root(&self) -> Result<PathBuf, EngineError> {
        let dir = match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir()?,
        };
        if !dir.is_dir() {
            return Err(EngineError::Scan(ScanError::InvalidRoot(dir)));
        }
        Ok(dir.canonicalize()?)
    }
}

/// Errors from engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Scan failed.
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Execution failed.
    #[error("execution failed: {0}")]
    Execute(#[from] ExecuteError),

    /// A command-line value is invalid.
    #[error("invalid {name}: {message}")]
    InvalidArgument {
        /// Flag or setting name.
        name: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// Filesystem error outside scanning and execution.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-invocation overrides for flatten settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenOverrides {
    /// Explicit root package (`--root`).
    pub root: Option<String>,
    /// Base directory (`--base-dir`).
    pub base_dir: Option<String>,
    /// Language preset (`--language`).
    pub language: Option<Language>,
}

/// Everything resolved for one invocation, from config to plan.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Effective language preset.
    pub language: Language,
    /// Scan options derived from config.
    pub scan: ScanOptions,
    /// Planning settings derived from config.
    pub settings: FlattenSettings,
}

impl Resolved {
    /// Merge overrides over `config`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidArgument` for a malformed root package
    /// or base directory.
    pub fn from_config(config: &Config, overrides: &FlattenOverrides) -> Result<Self, EngineError> {
        let project = config.project.as_ref();
        let language = overrides.language.unwrap_or_else(|| config.language());
        let delimiter = config.delimiter();

        let base_dir = overrides
            .base_dir
            .clone()
            .or_else(|| project.and_then(|p| p.base_dir.clone()))
            .unwrap_or_else(|| language.default_base_dir().to_string());
        let base_dir = BaseDir::parse(&base_dir).map_err(|e| EngineError::InvalidArgument {
            name: "base dir",
            message: e.to_string(),
        })?;

        let extensions = project
            .and_then(|p| p.extensions.clone())
            .unwrap_or_else(|| {
                language
                    .default_extensions()
                    .iter()
                    .map(|e| e.to_string())
                    .collect()
            });

        let root = overrides
            .root
            .as_deref()
            .or_else(|| config.root_package())
            .map(|root| NamespacePath::parse(root, delimiter).map(RootPrefix::from))
            .transpose()
            .map_err(|e| EngineError::InvalidArgument {
                name: "root package",
                message: e.to_string(),
            })?;

        Ok(Self {
            language,
            scan: ScanOptions {
                extensions,
                delimiter,
                source_dir: base_dir.clone(),
            },
            settings: FlattenSettings {
                root,
                base_dir,
                prune_empty_dirs: config.prune_empty_dirs(),
            },
        })
    }
}

/// A scanned and planned project, ready to preview or execute.
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Loaded configuration.
    pub config: Config,
    /// Resolved settings.
    pub resolved: Resolved,
    /// Scan result.
    pub snapshot: ProjectSnapshot,
    /// The flatten plan.
    pub plan: Plan,
}

/// Load config for the project and scan it, without planning.
///
/// # Errors
///
/// Returns an error if config cannot be loaded, overrides are invalid, or
/// the project cannot be scanned.
pub fn load_and_scan(
    ctx: &Context,
    overrides: &FlattenOverrides,
) -> Result<(Config, Resolved, ProjectSnapshot), EngineError> {
    let root = ctx.project_root()?;
    let loaded = Config::load(Some(&root))?;
    for warning in &loaded.warnings {
        log::warn!("{} ({})", warning.message, warning.path.display());
    }
    let config = loaded.config;

    let resolved = Resolved::from_config(&config, overrides)?;
    log::debug!(
        "language={} base_dir={} extensions={:?}",
        resolved.language,
        resolved.settings.base_dir,
        resolved.scan.extensions
    );

    let snapshot = scan(&root, &resolved.scan)?;
    Ok((config, resolved, snapshot))
}

/// Run Scan and Plan for the project in `ctx`.
///
/// # Errors
///
/// See [`load_and_scan`].
pub fn prepare(ctx: &Context, overrides: &FlattenOverrides) -> Result<Prepared, EngineError> {
    let (config, resolved, snapshot) = load_and_scan(ctx, overrides)?;
    let plan = plan_flatten(&snapshot.records, &resolved.settings);
    Ok(Prepared {
        config,
        resolved,
        snapshot,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::schema::ProjectConfig;

    fn config_with(project: ProjectConfig) -> Config {
        Config::from_parts(Default::default(), Some(project))
    }

    #[test]
    fn defaults_follow_language_preset() {
        let resolved = Resolved::from_config(&Config::default(), &FlattenOverrides::default()).unwrap();
        assert_eq!(resolved.language, Language::Kotlin);
        assert_eq!(resolved.settings.base_dir.to_string(), "src/main/kotlin");
        assert_eq!(resolved.scan.extensions, vec!["kt", "kts"]);
        assert_eq!(resolved.scan.source_dir, resolved.settings.base_dir);
        assert!(resolved.settings.root.is_none());
        assert!(resolved.settings.prune_empty_dirs);
    }

    #[test]
    fn language_override_changes_defaults() {
        let overrides = FlattenOverrides {
            language: Some(Language::Java),
            ..Default::default()
        };
        let resolved = Resolved::from_config(&Config::default(), &overrides).unwrap();
        assert_eq!(resolved.settings.base_dir.to_string(), "src/main/java");
        assert_eq!(resolved.scan.extensions, vec!["java"]);
    }

    #[test]
    fn flags_override_project_config() {
        let config = config_with(ProjectConfig {
            root_package: Some("com.config".to_string()),
            base_dir: Some("src".to_string()),
            ..Default::default()
        });
        let overrides = FlattenOverrides {
            root: Some("com.flag".to_string()),
            base_dir: Some("lib".to_string()),
            language: None,
        };

        let resolved = Resolved::from_config(&config, &overrides).unwrap();
        assert_eq!(resolved.settings.base_dir.to_string(), "lib");
        assert_eq!(
            resolved.settings.root.unwrap().to_string(),
            "com.flag"
        );
    }

    #[test]
    fn configured_root_uses_delimiter() {
        let config = config_with(ProjectConfig {
            root_package: Some("com:x".to_string()),
            delimiter: Some(':'),
            ..Default::default()
        });

        let resolved = Resolved::from_config(&config, &FlattenOverrides::default()).unwrap();
        let root = resolved.settings.root.unwrap();
        assert_eq!(root.as_namespace().segments(), &["com", "x"]);
        assert_eq!(resolved.scan.delimiter, ':');
    }

    #[test]
    fn empty_root_flag_is_an_explicit_empty_root() {
        let overrides = FlattenOverrides {
            root: Some(String::new()),
            ..Default::default()
        };
        let resolved = Resolved::from_config(&Config::default(), &overrides).unwrap();
        assert!(resolved.settings.root.unwrap().is_empty());
    }

    #[test]
    fn invalid_flags_rejected() {
        let bad_root = FlattenOverrides {
            root: Some("com..x".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Resolved::from_config(&Config::default(), &bad_root),
            Err(EngineError::InvalidArgument { .. })
        ));

        let bad_base = FlattenOverrides {
            base_dir: Some("../up".to_string()),
            ..Default::default()
        };
        assert!(Resolved::from_config(&Config::default(), &bad_base).is_err());
    }
}
