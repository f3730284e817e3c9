//! Board configuration.

use kanban_core::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for the board engine and its backend client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Backend root URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout applied to every backend call, in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Status codes used when the backend cannot provide them
    #[serde(default = "default_fallback_statuses")]
    pub fallback_statuses: Vec<StatusCode>,

    /// JSON translation catalog for status labels
    #[serde(default)]
    pub labels_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_call_timeout_secs() -> u64 {
    15
}

fn default_fallback_statuses() -> Vec<StatusCode> {
    StatusCode::canonical()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            call_timeout_secs: default_call_timeout_secs(),
            fallback_statuses: default_fallback_statuses(),
            labels_path: None,
        }
    }
}

impl BoardConfig {
    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Per-call timeout.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs.max(1))
    }

    /// Fallback status list; never empty.
    pub fn fallback_statuses(&self) -> Vec<StatusCode> {
        if self.fallback_statuses.is_empty() {
            StatusCode::canonical()
        } else {
            self.fallback_statuses.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_field_defaults() {
        let config: BoardConfig = serde_json::from_str(r#"{"call_timeout_secs": 3}"#).unwrap();
        assert_eq!(config.call_timeout(), Duration::from_secs(3));
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.fallback_statuses, StatusCode::canonical());
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = BoardConfig::from_file("/nonexistent/kanban/config.json").unwrap();
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn test_empty_fallback_reverts_to_canonical() {
        let config = BoardConfig {
            fallback_statuses: vec![],
            call_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.fallback_statuses().len(), 5);
        assert_eq!(config.call_timeout(), Duration::from_secs(1));
    }
}
