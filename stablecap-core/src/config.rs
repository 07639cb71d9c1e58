//! Run configuration loaded from TOML. Every field has a default, so an
//! empty file (or no file) is a valid configuration.

use crate::data::llama::DEFAULT_BASE_URL;
use crate::rank::DEFAULT_TOP_N;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Upper bound for `max_retries`; backoff doubles per attempt.
pub const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// API root, without trailing path.
    pub base_url: String,
    /// Number of assets shown individually; the rest go to others.
    pub top_n: usize,
    /// Pause between per-asset history requests.
    pub request_delay_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Retries for transient network failures (0 disables retry).
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each further retry.
    pub retry_backoff_ms: u64,
    /// Where the JSON document is written.
    pub output_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            top_n: DEFAULT_TOP_N,
            request_delay_ms: 500,
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
            output_path: PathBuf::from("data.json"),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be at least 1".into()));
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                self.max_retries
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.top_n, 10);
        assert_eq!(config.request_delay(), Duration::from_millis(500));
    }

    #[test]
    fn partial_override() {
        let config = Config::from_toml(
            r#"
top_n = 5
request_delay_ms = 0
output_path = "public/data.json"
"#,
        )
        .unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.request_delay(), Duration::ZERO);
        assert_eq!(config.output_path, PathBuf::from("public/data.json"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn zero_top_n_rejected() {
        let err = Config::from_toml("top_n = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn max_retries_is_capped() {
        let config = Config::from_toml("max_retries = 10").unwrap();
        assert_eq!(config.max_retries, MAX_RETRIES_LIMIT);

        let err = Config::from_toml("max_retries = 40").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("at most 10"));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = Config::from_toml("retries = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::from_file(Path::new("/nonexistent/stablecap.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/stablecap.toml"));
    }
}
