//! CLI configuration.
//!
//! Resolution order for the file: `--config`, then `$SKYSIFT_CONFIG`, then
//! `<config dir>/skysift/config.toml`. A missing default file is not an
//! error; a missing explicit file is. `SKYSIFT_INDEX_URL` and
//! `SKYSIFT_APPVIEW_URL` override the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skysift_client::ClientConfig;
use skysift_core::{Error, Result};

/// Project name used for the config directory and user-facing hints.
pub const PROJECT_NAME: &str = "skysift";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SKYSIFT_CONFIG";

/// Environment override for the index URL.
pub const INDEX_URL_ENV: &str = "SKYSIFT_INDEX_URL";

/// Environment override for the AppView URL.
pub const APPVIEW_URL_ENV: &str = "SKYSIFT_APPVIEW_URL";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkysiftConfig {
    /// Endpoints and HTTP settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Cache sizes.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Defaults applied to every search.
    #[serde(default)]
    pub search: SearchDefaults,
}

/// Cache sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// URI sets kept by the hydration cache.
    #[serde(default = "default_hydration_capacity")]
    pub hydration_capacity: usize,

    /// Resolved searches kept by the pipeline.
    #[serde(default = "default_search_capacity")]
    pub search_capacity: usize,
}

fn default_hydration_capacity() -> usize {
    skysift_search::DEFAULT_CAPACITY
}

fn default_search_capacity() -> usize {
    skysift_search::pipeline::DEFAULT_SEARCH_CACHE_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            hydration_capacity: default_hydration_capacity(),
            search_capacity: default_search_capacity(),
        }
    }
}

/// Defaults applied to every search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDefaults {
    /// Languages to search in when none are given, in preference order.
    #[serde(default = "default_preferred_languages")]
    pub preferred_languages: Vec<String>,

    /// Exclude every known moderation label unless told otherwise.
    #[serde(default = "default_true")]
    pub exclude_known_labels: bool,
}

fn default_preferred_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            preferred_languages: default_preferred_languages(),
            exclude_known_labels: true,
        }
    }
}

impl SkysiftConfig {
    /// `<config dir>/skysift/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// Resolve the config file path from the flag, the environment, or the
    /// platform default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        Self::resolve_config_path_with(explicit, std::env::var(CONFIG_ENV).ok())
    }

    fn resolve_config_path_with(explicit: Option<&str>, env: Option<String>) -> Option<PathBuf> {
        explicit
            .map(PathBuf::from)
            .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
            .or_else(Self::default_config_path)
    }

    /// Load configuration and apply environment overrides.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let explicit = explicit
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV).ok().filter(|v| !v.is_empty()));

        let mut config = match explicit {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serialize as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Apply URL overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(INDEX_URL_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!(var = INDEX_URL_ENV, "index URL overridden");
            self.client.index_url = url;
        }
        if let Some(url) = lookup(APPVIEW_URL_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!(var = APPVIEW_URL_ENV, "AppView URL overridden");
            self.client.appview_url = url;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SkysiftConfig::default();
        assert_eq!(config.client.index_url, "http://localhost:8080");
        assert_eq!(config.cache.hydration_capacity, 16);
        assert_eq!(config.search.preferred_languages, vec!["en"]);
        assert!(config.search.exclude_known_labels);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = SkysiftConfig::from_toml_str(
            "[client]\nindex_url = \"https://index.example\"\n\n[search]\nexclude_known_labels = false\n",
        )
        .unwrap();
        assert_eq!(config.client.index_url, "https://index.example");
        assert_eq!(config.client.appview_url, "https://public.api.bsky.app");
        assert!(!config.search.exclude_known_labels);
        assert_eq!(config.search.preferred_languages, vec!["en"]);
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let config = SkysiftConfig::default();
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[client]"));
        assert!(text.contains("[cache]"));
        assert_eq!(SkysiftConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = SkysiftConfig::from_toml_str("client = [").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = SkysiftConfig::resolve_config_path_with(
            Some("/explicit/config.toml"),
            Some("/from/env.toml".to_string()),
        );
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_env_path_used_without_flag() {
        let path =
            SkysiftConfig::resolve_config_path_with(None, Some("/from/env.toml".to_string()));
        assert_eq!(path, Some(PathBuf::from("/from/env.toml")));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let err = SkysiftConfig::load(Some(path.to_str().unwrap())).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\nhydration_capacity = 4\n").unwrap();
        let config = SkysiftConfig::from_file(&path).unwrap();
        assert_eq!(config.cache.hydration_capacity, 4);
        assert_eq!(config.cache.search_capacity, 32);
    }

    #[test]
    fn test_overrides_replace_urls() {
        let mut config = SkysiftConfig::default();
        config.apply_overrides(|key| match key {
            INDEX_URL_ENV => Some("https://override.example".to_string()),
            APPVIEW_URL_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.client.index_url, "https://override.example");
        assert_eq!(config.client.appview_url, "https://public.api.bsky.app");
    }
}
