//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! flatlayout has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Per-project settings (root package, base directory, ...)
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values (from the language preset)
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$FLATLAYOUT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/flatlayout/config.toml`
//! 3. `~/.flatlayout/config.toml` (canonical write location)
//!
//! # Project Config Locations
//!
//! Searched in order:
//! 1. `.flatlayout/config.toml` (canonical)
//! 2. `flatlayout.toml` (compatibility, warns)
//!
//! # Example
//!
//! ```no_run
//! use flatlayout::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! let config = result.config;
//!
//! match config.root_package() {
//!     Some(root) => println!("Root package: {}", root),
//!     None => println!("Root package: discovered"),
//! }
//! println!("Base dir: {}", config.base_dir());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, Language, ProjectConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::paths::ProjectPaths;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// This struct provides accessor methods that apply precedence rules
/// automatically. Project config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Project configuration (if one was found)
    pub project: Option<ProjectConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the project config file (if loaded)
    project_path: Option<PathBuf>,
}

impl Config {
    /// Build a config from already-parsed parts, with no file provenance.
    pub fn from_parts(global: GlobalConfig, project: Option<ProjectConfig>) -> Self {
        Self {
            global,
            project,
            global_path: None,
            project_path: None,
        }
    }

    /// Load configuration from default locations.
    ///
    /// If `project_root` is provided, also loads project-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(project_root: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), project_root)
    }

    /// Load configuration from an explicit global config file.
    ///
    /// `global_path` of `None` (or a path that does not exist) means
    /// global defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation.
    pub fn load_from(
        global_path: Option<&Path>,
        project_root: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (global, global_path) = match global_path.filter(|p| p.exists()) {
            Some(path) => (Self::read_toml::<GlobalConfig>(path)?, Some(path.to_path_buf())),
            None => (GlobalConfig::default(), None),
        };

        let (project, project_path) = if let Some(root) = project_root {
            Self::load_project(root, &mut warnings)?
        } else {
            (None, None)
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        log::debug!(
            "config loaded (global: {:?}, project: {:?})",
            global_path,
            project_path
        );

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path,
                project_path,
            },
            warnings,
        })
    }

    /// Locate the global config file, if any.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $FLATLAYOUT_CONFIG
        if let Ok(path) = std::env::var("FLATLAYOUT_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/flatlayout/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("flatlayout/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.flatlayout/config.toml
        Self::global_config_path().ok().filter(|p| p.exists())
    }

    /// Load project configuration from standard locations.
    fn load_project(
        project_root: &Path,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<ProjectConfig>, Option<PathBuf>), ConfigError> {
        let paths = ProjectPaths::new(project_root);

        // 1. Check .flatlayout/config.toml (canonical)
        let canonical = paths.config_path();
        if canonical.exists() {
            let config = Self::read_toml(&canonical)?;
            return Ok((Some(config), Some(canonical)));
        }

        // 2. Check flatlayout.toml (compatibility)
        let compat = paths.compat_config_path();
        if compat.exists() {
            warnings.push(ConfigWarning {
                message: format!(
                    "Using deprecated config location. Please move to '{}'",
                    canonical.display()
                ),
                path: compat.clone(),
            });
            let config = Self::read_toml(&compat)?;
            return Ok((Some(config), Some(compat)));
        }

        Ok((None, None))
    }

    /// Read and parse a TOML config file.
    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.flatlayout/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".flatlayout/config.toml"))
    }

    /// Write project config atomically to the canonical location.
    ///
    /// Creates parent directories if needed. Uses atomic write
    /// (write to temp file, then rename) to prevent corruption.
    pub fn write_project(
        project_root: &Path,
        config: &ProjectConfig,
    ) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = ProjectPaths::new(project_root).config_path();
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file atomically.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        // Write to temp file in same directory (for atomic rename)
        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the explicitly configured root package.
    ///
    /// Returns `None` if not configured (discovery applies).
    pub fn root_package(&self) -> Option<&str> {
        self.project.as_ref().and_then(|p| p.root_package.as_deref())
    }

    /// Get the language preset.
    ///
    /// Defaults to Kotlin if not configured.
    pub fn language(&self) -> Language {
        self.project
            .as_ref()
            .and_then(|p| p.language)
            .or(self.global.language)
            .unwrap_or_default()
    }

    /// Get the base directory.
    ///
    /// Defaults to the language preset's source directory.
    pub fn base_dir(&self) -> String {
        self.project
            .as_ref()
            .and_then(|p| p.base_dir.clone())
            .unwrap_or_else(|| self.language().default_base_dir().to_string())
    }

    /// Get the scanned file extensions.
    ///
    /// Defaults to the language preset's extensions.
    pub fn extensions(&self) -> Vec<String> {
        self.project
            .as_ref()
            .and_then(|p| p.extensions.clone())
            .unwrap_or_else(|| {
                self.language()
                    .default_extensions()
                    .iter()
                    .map(|e| e.to_string())
                    .collect()
            })
    }

    /// Get the namespace delimiter.
    ///
    /// Defaults to `.` if not configured.
    pub fn delimiter(&self) -> char {
        self.project
            .as_ref()
            .and_then(|p| p.delimiter)
            .unwrap_or('.')
    }

    /// Check if emptied directories should be removed after moving.
    ///
    /// Defaults to `true` if not configured.
    pub fn prune_empty_dirs(&self) -> bool {
        self.project
            .as_ref()
            .and_then(|p| p.prune_empty_dirs)
            .or(self.global.prune_empty_dirs)
            .unwrap_or(true)
    }

    /// Check if interactive mode is enabled by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
