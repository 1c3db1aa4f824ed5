mod schema;

pub use schema::Config;

use crate::catalog::{load_catalog, ReferenceCatalog};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/water-score/)
///
/// `None` when the home directory cannot be determined.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("water-score"))
}

/// Get the default config file path (~/.config/water-score/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

fn read_config(path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))?;

    Ok(config)
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/water-score/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicit config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
///
/// A missing default config file is not an error: defaults apply.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    if let Some(explicit) = path {
        if !explicit.exists() {
            anyhow::bail!("Config file not found at {}", explicit.display());
        }
        return read_config(&explicit);
    }

    match get_config_path() {
        Some(default_path) if default_path.exists() => read_config(&default_path),
        Some(default_path) => {
            log::debug!("No config at {}, using defaults", default_path.display());
            Ok(Config::default())
        }
        None => {
            log::warn!("Could not determine home directory, using default config");
            Ok(Config::default())
        }
    }
}

/// Catalog named by the config, or the built-in one.
///
/// A relative catalog path is resolved against the config file's directory.
pub fn load_catalog_for(config: &Config, config_path: Option<&Path>) -> Result<ReferenceCatalog> {
    match &config.catalog {
        Some(path) => {
            let resolved = match config_path.and_then(Path::parent) {
                Some(base) if path.is_relative() => base.join(path),
                _ => path.clone(),
            };
            load_catalog(&resolved)
        }
        None => ReferenceCatalog::builtin().context("Built-in catalog rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringConfig;
    use std::env;

    #[test]
    fn test_missing_explicit_config_is_error() {
        let path = env::temp_dir().join("water_score_no_such_config.yaml");
        let _ = fs::remove_file(&path);
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_config_with_scoring() {
        let path = env::temp_dir().join("water_score_test_config.yaml");
        fs::write(
            &path,
            r#"
scoring:
  recent_window: "90days"
  temporal_bonus: 2.5
"#,
        )
        .unwrap();

        let config = load_config(Some(path.clone())).unwrap();
        assert!(config.catalog.is_none());
        let scoring = config.effective_scoring();
        assert_eq!(scoring.recent_window, Some("90days".to_string()));
        assert_eq!(scoring.temporal_bonus_cap(), 2.5);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let path = env::temp_dir().join("water_score_test_bad_config.yaml");
        fs::write(&path, "queries: []\n").unwrap();
        assert!(load_config(Some(path.clone())).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.effective_scoring(), ScoringConfig::default());
    }

    #[test]
    fn test_config_dir_under_home() {
        if let Some(dir) = get_config_dir() {
            assert!(dir.ends_with(".config/water-score"));
        }
    }

    #[test]
    fn test_builtin_catalog_without_override() {
        let catalog = load_catalog_for(&Config::default(), None).unwrap();
        assert_eq!(catalog.parameter_count(), 47);
    }

    #[test]
    fn test_relative_catalog_resolved_against_config_dir() {
        let dir = env::temp_dir().join("water_score_test_catalog_dir");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("catalog.yaml"),
            r#"
version: "test-1"
categories:
  - key: basics
    name: Basics
    weight: 1.0
    critical: ["1302"]
parameters:
  - code: "1302"
    name: pH
    category: basics
    scoring: { kind: optimal_central, ideal: 7.2, beta: 25, gamma: 1.6, min_acceptable: 6.5, max_acceptable: 9.0 }
"#,
        )
        .unwrap();

        let config = Config {
            catalog: Some(PathBuf::from("catalog.yaml")),
            scoring: None,
        };
        let catalog = load_catalog_for(&config, Some(&dir.join("config.yaml"))).unwrap();
        assert_eq!(catalog.version(), Some("test-1"));
        assert_eq!(catalog.parameter_count(), 1);

        let _ = fs::remove_dir_all(&dir);
    }
}
