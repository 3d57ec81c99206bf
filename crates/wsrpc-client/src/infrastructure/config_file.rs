//! TOML configuration file for the client binary.
//!
//! The file is optional and every key has a default, so an empty file is a
//! valid configuration:
//!
//! ```toml
//! url = "ws://localhost:17680/_myws/_conn/"
//! keepalive_interval_ms = 2000
//! ```
//!
//! Command-line flags are applied on top of the loaded values in `main.rs`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wsrpc_core::protocol::messages::DEFAULT_KEEPALIVE_MS;

use crate::domain::config::{default_url, ClientConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// On-disk configuration schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    /// WebSocket URL of the peer endpoint.
    #[serde(default = "default_url")]
    pub url: String,
    /// Keepalive period in milliseconds.
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,
}

fn default_keepalive_interval_ms() -> u64 {
    DEFAULT_KEEPALIVE_MS
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
        }
    }
}

impl From<FileConfig> for ClientConfig {
    fn from(file: FileConfig) -> Self {
        Self {
            url: file.url,
            keepalive_interval: Duration::from_millis(file.keepalive_interval_ms),
        }
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed or a key has the
/// wrong type.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads the configuration file at `path`.
///
/// The path was asked for explicitly, so a missing file is an error rather
/// than a silent fallback to defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if its content is invalid.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        // Arrange / Act
        let cfg = parse_config("").unwrap();

        // Assert
        assert_eq!(cfg, FileConfig::default());
        assert_eq!(ClientConfig::from(cfg), ClientConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let cfg = parse_config("keepalive_interval_ms = 500").unwrap();
        assert_eq!(cfg.url, default_url());
        assert_eq!(cfg.keepalive_interval_ms, 500);
    }

    #[test]
    fn test_full_file_converts_to_client_config() {
        let cfg = parse_config(
            r#"
            url = "ws://10.0.0.5:9000/rpc"
            keepalive_interval_ms = 1500
            "#,
        )
        .unwrap();

        let client: ClientConfig = cfg.into();

        assert_eq!(client.url, "ws://10.0.0.5:9000/rpc");
        assert_eq!(client.keepalive_interval, Duration::from_millis(1500));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let result = parse_config(r#"keepalive_interval_ms = "fast""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/wsrpc.toml");

        let err = load_config(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("wsrpc.toml"));
    }

    #[test]
    fn test_load_config_from_temp_file() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("wsrpc_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let written = FileConfig {
            url: "ws://127.0.0.1:1234/x/".to_string(),
            keepalive_interval_ms: 250,
        };
        std::fs::write(&path, toml::to_string_pretty(&written).unwrap()).unwrap();

        // Act
        let loaded = load_config(&path).unwrap();

        // Assert
        assert_eq!(loaded, written);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }
}
