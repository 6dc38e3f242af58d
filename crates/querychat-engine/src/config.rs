//! Configuration for the querychat client.
//!
//! This module defines where the backend lives and how replies are ordered
//! in the transcript. Configuration is stored as JSON under `.querychat/`.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding querychat's local files.
pub const CONFIG_DIR: &str = ".querychat";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding [`Config::base_url`].
pub const URL_ENV: &str = "QUERYCHAT_URL";

/// Main configuration for querychat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the question endpoint.
    #[serde(default = "default_ask_path")]
    pub ask_path: String,

    /// Path of the upload endpoint.
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// How completed replies are ordered in the transcript.
    #[serde(default)]
    pub reply_ordering: ReplyOrdering,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_ask_path() -> String {
    "/ask".into()
}

fn default_upload_path() -> String {
    "/upload".into()
}

/// Ordering policy for replies to overlapping requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrdering {
    /// Append replies as they resolve.
    #[default]
    Arrival,
    /// Hold replies until every earlier request has resolved.
    Sequential,
}

impl Config {
    /// Default config file location, relative to `root`.
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration from a file, or defaults if the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Apply the [`URL_ENV`] override, if set.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidUrl(format!(
                "{}: unsupported scheme {other}",
                self.base_url
            ))),
        }
    }

    /// Full URL of the question endpoint.
    pub fn ask_url(&self) -> String {
        self.endpoint(&self.ask_path)
    }

    /// Full URL of the upload endpoint.
    pub fn upload_url(&self) -> String {
        self.endpoint(&self.upload_path)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ask_path: default_ask_path(),
            upload_path: default_upload_path(),
            reply_ordering: ReplyOrdering::default(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Base URL is not usable.
    #[error("Invalid base URL {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.reply_ordering, ReplyOrdering::Arrival);
        assert_eq!(config.ask_url(), "http://127.0.0.1:8000/ask");
        assert_eq!(config.upload_url(), "http://127.0.0.1:8000/upload");
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let config = Config {
            base_url: "https://data.example.com/api/".into(),
            ask_path: "ask".into(),
            ..Config::default()
        };
        assert_eq!(config.ask_url(), "https://data.example.com/api/ask");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"reply_ordering": "sequential"}"#).unwrap();
        assert_eq!(config.reply_ordering, ReplyOrdering::Sequential);
        assert_eq!(config.ask_path, "/ask");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::default_path(dir.path());

        let config = Config {
            base_url: "http://localhost:9000".into(),
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let bad = Config {
            base_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidUrl(_))));

        let ftp = Config {
            base_url: "ftp://example.com".into(),
            ..Config::default()
        };
        assert!(matches!(ftp.validate(), Err(ConfigError::InvalidUrl(_))));
    }
}
