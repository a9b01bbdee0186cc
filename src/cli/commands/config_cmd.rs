//! config command - Show, get, or set configuration values

use crate::core::config::schema::{Language, ProjectConfig};
use crate::core::config::Config;
use crate::engine::{Context, FlattenOverrides, Resolved};
use crate::ui::output;
use anyhow::{bail, Context as _, Result};

/// Keys understood by `get` and `set`.
const KEYS: &[&str] = &[
    "root_package",
    "base_dir",
    "language",
    "extensions",
    "delimiter",
    "prune_empty_dirs",
    "interactive",
];

fn load(ctx: &Context) -> Result<(Config, Resolved)> {
    let root = ctx.project_root()?;
    let loaded = Config::load(Some(&root)).context("Failed to load config")?;
    for warning in &loaded.warnings {
        log::warn!("{} ({})", warning.message, warning.path.display());
    }
    let resolved = Resolved::from_config(&loaded.config, &FlattenOverrides::default())?;
    Ok((loaded.config, resolved))
}

fn effective_value(config: &Config, resolved: &Resolved, key: &str) -> Result<String> {
    let value = match key {
        "root_package" => config
            .root_package()
            .map(|root| {
                if root.is_empty() {
                    "\"\" (no moves)".to_string()
                } else {
                    root.to_string()
                }
            })
            .unwrap_or_else(|| "(discovered)".to_string()),
        "base_dir" => resolved.settings.base_dir.to_string(),
        "language" => resolved.language.to_string(),
        "extensions" => resolved.scan.extensions.join(","),
        "delimiter" => resolved.scan.delimiter.to_string(),
        "prune_empty_dirs" => resolved.settings.prune_empty_dirs.to_string(),
        "interactive" => config.interactive().to_string(),
        _ => bail!("Unknown configuration key: {} (known: {})", key, KEYS.join(", ")),
    };
    Ok(value)
}

/// Show the effective configuration and where it came from.
pub fn show(ctx: &Context) -> Result<()> {
    let (config, resolved) = load(ctx)?;

    println!("# Effective configuration");
    for key in KEYS {
        println!("{} = {}", key, effective_value(&config, &resolved, key)?);
    }

    if !ctx.quiet {
        println!();
        println!("# Sources");
        let describe = |path: Option<&std::path::Path>| {
            path.map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        };
        println!("global = {}", describe(config.global_config_loaded_from()));
        println!("project = {}", describe(config.project_config_loaded_from()));
    }

    Ok(())
}

/// Print one effective configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let (config, resolved) = load(ctx)?;
    println!("{}", effective_value(&config, &resolved, key)?);
    Ok(())
}

/// Set a project configuration value.
///
/// The project config is rewritten at its canonical location, which also
/// migrates a config found at the compatibility location.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let root = ctx.project_root()?;
    let loaded = Config::load(Some(&root)).context("Failed to load config")?;
    let mut project = loaded.config.project.unwrap_or_default();

    apply_value(&mut project, key, value)?;

    let path = Config::write_project(&root, &project).context("Failed to write config")?;
    output::success(
        format!("Set {} = {} in {}", key, value, path.display()),
        super::verbosity(ctx),
    );
    Ok(())
}

fn apply_value(project: &mut ProjectConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "root_package" => project.root_package = Some(value.to_string()),
        "base_dir" => project.base_dir = Some(value.to_string()),
        "language" => project.language = Some(value.parse::<Language>()?),
        "extensions" => {
            project.extensions = Some(
                value
                    .split(',')
                    .map(|ext| ext.trim().trim_start_matches('.').to_string())
                    .filter(|ext| !ext.is_empty())
                    .collect(),
            )
        }
        "delimiter" => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => project.delimiter = Some(c),
                _ => bail!("delimiter must be a single character, got '{}'", value),
            }
        }
        "prune_empty_dirs" => {
            project.prune_empty_dirs = Some(
                value
                    .parse::<bool>()
                    .with_context(|| format!("expected true or false, got '{}'", value))?,
            )
        }
        "interactive" => bail!("interactive is a global setting; edit the global config file"),
        _ => bail!("Unknown configuration key: {} (known: {})", key, KEYS.join(", ")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_value_sets_fields() {
        let mut project = ProjectConfig::default();
        apply_value(&mut project, "root_package", "com.example").unwrap();
        apply_value(&mut project, "language", "java").unwrap();
        apply_value(&mut project, "extensions", "java, .kt").unwrap();
        apply_value(&mut project, "delimiter", ":").unwrap();
        apply_value(&mut project, "prune_empty_dirs", "false").unwrap();

        assert_eq!(project.root_package.as_deref(), Some("com.example"));
        assert_eq!(project.language, Some(Language::Java));
        assert_eq!(
            project.extensions,
            Some(vec!["java".to_string(), "kt".to_string()])
        );
        assert_eq!(project.delimiter, Some(':'));
        assert_eq!(project.prune_empty_dirs, Some(false));
    }

    #[test]
    fn apply_value_rejects_bad_input() {
        let mut project = ProjectConfig::default();
        assert!(apply_value(&mut project, "delimiter", "::").is_err());
        assert!(apply_value(&mut project, "prune_empty_dirs", "maybe").is_err());
        assert!(apply_value(&mut project, "language", "cobol").is_err());
        assert!(apply_value(&mut project, "interactive", "true").is_err());
        assert!(apply_value(&mut project, "nope", "x").is_err());
    }

    #[test]
    fn effective_defaults() {
        let config = Config::default();
        let resolved = Resolved::from_config(&config, &FlattenOverrides::default()).unwrap();
        assert_eq!(
            effective_value(&config, &resolved, "root_package").unwrap(),
            "(discovered)"
        );
        assert_eq!(
            effective_value(&config, &resolved, "extensions").unwrap(),
            "kt,kts"
        );
        assert!(effective_value(&config, &resolved, "bogus").is_err());
    }
}
