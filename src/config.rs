//! Configuration file parser for ~/.config/newsdigest/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as warnings, since they are
//! usually typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::util::{validate_api_base, UrlValidationError};

/// Environment variable that overrides `api_url` from the config file.
pub const API_URL_ENV: &str = "NEWSDIGEST_API_URL";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// The configured API root is unusable.
    #[error("Invalid api_url: {0}")]
    ApiUrl(#[from] UrlValidationError),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the backend REST API, e.g. `https://digest.example.com/api`.
    pub api_url: String,

    /// Timeout for ordinary requests (auth, preferences, feed, search).
    pub request_timeout_secs: u64,

    /// Timeout for summarization, which runs an LLM on the backend.
    pub summary_timeout_secs: u64,

    /// How long status bar messages stay visible.
    pub status_message_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 30,
            summary_timeout_secs: 90,
            status_message_secs: 3,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 4] = [
        "api_url",
        "request_timeout_secs",
        "summary_timeout_secs",
        "status_message_secs",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to avoid slurping a huge file
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), api_url = %config.api_url, "Loaded configuration");
        Ok(config)
    }

    /// Apply overrides in precedence order: env var, then explicit CLI value.
    pub fn with_overrides(mut self, env_api_url: Option<String>, cli_api_url: Option<String>) -> Self {
        if let Some(url) = env_api_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(source = API_URL_ENV, "api_url overridden by environment");
            self.api_url = url;
        }
        if let Some(url) = cli_api_url {
            tracing::debug!(source = "--api-url", "api_url overridden by command line");
            self.api_url = url;
        }
        self
    }

    /// Check that the configured API root is usable before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_api_base(&self.api_url)?;
        Ok(())
    }

    /// API root without a trailing slash, ready for `format!("{}/path")`.
    pub fn api_root(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_secs.max(1))
    }

    pub fn status_message_ttl(&self) -> Duration {
        Duration::from_secs(self.status_message_secs.max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("newsdigest_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.summary_timeout_secs, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newsdigest_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_url, Config::default().api_url);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "api_url = \"https://digest.example.com/api\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_url, "https://digest.example.com/api");
        assert_eq!(config.summary_timeout_secs, 90);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "request_timeout_secs = 5\ntheme = \"dark\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_cli_override_beats_env() {
        let config = Config::default().with_overrides(
            Some("https://env.example.com/api".to_string()),
            Some("https://cli.example.com/api".to_string()),
        );
        assert_eq!(config.api_url, "https://cli.example.com/api");
    }

    #[test]
    fn test_env_override_ignored_when_blank() {
        let config = Config::default().with_overrides(Some("  ".to_string()), None);
        assert_eq!(config.api_url, Config::default().api_url);
    }

    #[test]
    fn test_plain_http_remote_api_rejected() {
        let config = Config::default().with_overrides(None, Some("http://digest.example.com/api".into()));
        assert!(matches!(config.validate(), Err(ConfigError::ApiUrl(_))));
    }

    #[test]
    fn test_api_root_strips_trailing_slash() {
        let config = Config::default().with_overrides(None, Some("https://x.example.com/api/".into()));
        assert_eq!(config.api_root(), "https://x.example.com/api");
    }
}
