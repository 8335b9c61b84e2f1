//! Runtime configuration.
//!
//! Settings come from an optional YAML file; the CLI overlays a few of them
//! (see [`crate::cli`]). Everything has a default so the binary runs with no
//! config file at all.
//!
//! ```yaml
//! data_dir: ./data
//! min_article_chars: 100
//! http:
//!   timeout_secs: 10
//!   user_agent: "Mozilla/5.0 ..."
//! schedule:
//!   interval_minutes: 30
//! images:
//!   default: https://cdn.example.com/categories/default.png
//!   by_label:
//!     World: https://cdn.example.com/categories/world.png
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Browser-like user agent; many feed servers reject default HTTP clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Outbound HTTP settings shared by the feed fetcher and the article extractor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
        }
    }
}

/// Category display images, keyed by exact category label.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    pub default: Option<String>,
    pub by_label: HashMap<String, String>,
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Extracted text shorter than this is not persisted.
    pub min_article_chars: usize,
    pub http: HttpConfig,
    pub schedule: ScheduleConfig,
    pub images: ImageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            min_article_chars: 100,
            http: HttpConfig::default(),
            schedule: ScheduleConfig::default(),
            images: ImageConfig::default(),
        }
    }
}

impl Config {
    /// Load settings from a YAML file, or the defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to an empty mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert_eq!(config.min_article_chars, 100);
        assert_eq!(config.schedule.interval_minutes, 30);
        assert!(config.http.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            r#"
http:
  timeout_secs: 3
images:
  default: https://img.example.com/default.png
  by_label:
    World: https://img.example.com/world.png
"#,
        )
        .unwrap();

        assert_eq!(config.http.timeout_secs, 3);
        assert_eq!(config.http.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(
            config.images.by_label.get("World").map(String::as_str),
            Some("https://img.example.com/world.png")
        );
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
