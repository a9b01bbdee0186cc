//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$FLATLAYOUT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/flatlayout/config.toml`
//! 3. `~/.flatlayout/config.toml` (canonical write location)
//!
//! # Project Config
//!
//! Located at `<project>/.flatlayout/config.toml` (canonical).
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., `root_package` must be a valid namespace path).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{validate_delimiter, BaseDir, NamespacePath};

/// Source language preset.
///
/// A preset supplies the conventional base directory and the file
/// extensions that carry package declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Kotlin (`src/main/kotlin`, `.kt` / `.kts`).
    #[default]
    Kotlin,
    /// Java (`src/main/java`, `.java`).
    Java,
}

impl Language {
    /// All supported language names.
    pub const NAMES: &'static [&'static str] = &["kotlin", "java"];

    /// Conventional top-level source directory.
    pub fn default_base_dir(&self) -> &'static str {
        match self {
            Language::Kotlin => "src/main/kotlin",
            Language::Java => "src/main/java",
        }
    }

    /// File extensions scanned by default.
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Kotlin => &["kt", "kts"],
            Language::Java => &["java"],
        }
    }

    /// Lowercase name as used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Kotlin => "kotlin",
            Language::Java => "java",
        }
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kotlin" | "kt" => Ok(Language::Kotlin),
            "java" => Ok(Language::Java),
            other => Err(ConfigError::InvalidValue(format!(
                "invalid language '{}', must be one of: {}",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// language = "kotlin"
/// interactive = true
/// prune_empty_dirs = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default language preset
    pub language: Option<Language>,

    /// Default interactive mode
    pub interactive: Option<bool>,

    /// Remove directories left empty after moving files
    pub prune_empty_dirs: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// Every field is checked by its type during parsing, so this never
    /// fails today; it keeps the load path uniform with [`ProjectConfig`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Project configuration.
///
/// # Example
///
/// ```toml
/// root_package = "ch.frankel.blog"
/// base_dir = "src/main/kotlin"
/// language = "kotlin"
/// extensions = ["kt", "kts"]
/// delimiter = "."
/// prune_empty_dirs = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Explicit root package; discovery runs when unset
    pub root_package: Option<String>,

    /// Directory flattened files are placed under
    pub base_dir: Option<String>,

    /// Language preset
    pub language: Option<Language>,

    /// File extensions to scan (without the leading dot)
    pub extensions: Option<Vec<String>>,

    /// Namespace delimiter
    pub delimiter: Option<char>,

    /// Remove directories left empty after moving files
    pub prune_empty_dirs: Option<bool>,
}

impl ProjectConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delimiter = self.delimiter.unwrap_or('.');
        validate_delimiter(delimiter)
            .map_err(|e| ConfigError::InvalidValue(format!("invalid delimiter: {}", e)))?;

        if let Some(root) = &self.root_package {
            NamespacePath::parse(root, delimiter).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid root_package: {}", e))
            })?;
        }

        if let Some(base_dir) = &self.base_dir {
            BaseDir::parse(base_dir)
                .map_err(|e| ConfigError::InvalidValue(format!("invalid base_dir: {}", e)))?;
        }

        if let Some(extensions) = &self.extensions {
            if extensions.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "extensions cannot be empty".to_string(),
                ));
            }
            if let Some(bad) = extensions
                .iter()
                .find(|ext| ext.is_empty() || ext.contains(['.', '/', '\\']))
            {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid extension '{}', expected a bare extension like \"kt\"",
                    bad
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod language {
        use super::*;

        #[test]
        fn presets() {
            assert_eq!(Language::default(), Language::Kotlin);
            assert_eq!(Language::Kotlin.default_base_dir(), "src/main/kotlin");
            assert_eq!(Language::Java.default_extensions(), &["java"]);
        }

        #[test]
        fn from_str() {
            assert_eq!("Kotlin".parse::<Language>().unwrap(), Language::Kotlin);
            assert_eq!("java".parse::<Language>().unwrap(), Language::Java);
            assert!("scala".parse::<Language>().is_err());
        }
    }

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.language.is_none());
            assert!(config.interactive.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn roundtrip() {
            let config = GlobalConfig {
                language: Some(Language::Java),
                interactive: Some(false),
                prune_empty_dirs: Some(true),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn unknown_language_rejected() {
            let result: Result<GlobalConfig, _> = toml::from_str(r#"language = "cobol""#);
            assert!(result.is_err());
        }
    }

    mod project_config {
        use super::*;

        #[test]
        fn valid_root_package() {
            let config = ProjectConfig {
                root_package: Some("ch.frankel.blog".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn invalid_root_package() {
            let config = ProjectConfig {
                root_package: Some("ch..blog".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn root_package_uses_configured_delimiter() {
            let config = ProjectConfig {
                root_package: Some("ch:frankel".to_string()),
                delimiter: Some(':'),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn alphanumeric_delimiter_rejected() {
            let config = ProjectConfig {
                delimiter: Some('x'),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn invalid_base_dir() {
            for base_dir in ["", "/abs", "src/../x"] {
                let config = ProjectConfig {
                    base_dir: Some(base_dir.to_string()),
                    ..Default::default()
                };
                assert!(config.validate().is_err(), "{base_dir} should be rejected");
            }
        }

        #[test]
        fn invalid_extensions() {
            let empty = ProjectConfig {
                extensions: Some(vec![]),
                ..Default::default()
            };
            assert!(empty.validate().is_err());

            let dotted = ProjectConfig {
                extensions: Some(vec![".kt".to_string()]),
                ..Default::default()
            };
            assert!(dotted.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = ProjectConfig {
                root_package: Some("com.example".to_string()),
                base_dir: Some("src/main/kotlin".to_string()),
                language: Some(Language::Kotlin),
                extensions: Some(vec!["kt".to_string()]),
                delimiter: Some('.'),
                prune_empty_dirs: Some(false),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: ProjectConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                root_package = "com.example"
                unknown_field = true
            "#;

            let result: Result<ProjectConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }
}
