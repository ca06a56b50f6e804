//! Configuration for a [`Session`](crate::Session) and the [`HnClient`](crate::HnClient).
//!
//! All fields have defaults; override with struct update syntax:
//!
//! ```rust
//! use contrario_core::Config;
//!
//! let config = Config {
//!     weekly_goal: 14,
//!     ..Config::new("/tmp/contrario")
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_HN_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration error: {0} must be at least 1")]
    Zero(&'static str),

    #[error("Configuration error: HN base URL is empty")]
    EmptyBaseUrl,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Directory holding one JSON file per persisted key.
    pub data_dir: PathBuf,

    /// Bundled facts file. `None` uses the built-in defaults.
    pub facts_path: Option<PathBuf>,

    /// Weekly discovery goal for a fresh journey.
    /// Default: 21
    pub weekly_goal: u32,

    /// How long file locks are retried before giving up.
    /// Default: zero (fail immediately)
    pub lock_timeout: Duration,

    pub hn: HnConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("contrario-data"),
            facts_path: None,
            weekly_goal: crate::journey::DEFAULT_WEEKLY_GOAL,
            lock_timeout: Duration::ZERO,
            hn: HnConfig::default(),
        }
    }
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_facts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.facts_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weekly_goal == 0 {
            return Err(ConfigError::Zero("weekly_goal"));
        }
        self.hn.validate()
    }
}

/// Hacker News client settings.
#[derive(Clone, Debug)]
pub struct HnConfig {
    pub base_url: String,

    /// Item fetches per batch; also the concurrency within a batch.
    /// Default: 10
    pub batch_size: usize,

    /// Stories per load when the caller does not say.
    /// Default: 30
    pub default_limit: usize,
}

impl Default for HnConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HN_BASE_URL.to_string(),
            batch_size: 10,
            default_limit: 30,
        }
    }
}

impl HnConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Zero("batch_size"));
        }
        if self.default_limit == 0 {
            return Err(ConfigError::Zero("default_limit"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.hn.batch_size, 10);
        assert_eq!(config.hn.default_limit, 30);
        assert_eq!(config.weekly_goal, 21);
    }

    #[test]
    fn zero_values_rejected() {
        let config = Config {
            weekly_goal: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Zero("weekly_goal")));

        let hn = HnConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert_eq!(hn.validate(), Err(ConfigError::Zero("batch_size")));

        let hn = HnConfig {
            base_url: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(hn.validate(), Err(ConfigError::EmptyBaseUrl));
    }

    #[test]
    fn builder_style_facts_path() {
        let config = Config::new("/data").with_facts_path("/data/facts.json");
        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.facts_path, Some(PathBuf::from("/data/facts.json")));
    }
}
