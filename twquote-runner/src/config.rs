//! Snapshot run configuration.
//!
//! Read from a TOML file; every field has a default so an empty file (or no
//! file at all) is a valid configuration. Command-line flags override the
//! values read here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use twquote_core::data::ticker_list;
use twquote_core::data::Lookback;
use twquote_core::engine::IndicatorProfile;
use twquote_core::snapshot::DEFAULT_HISTORY_LEN;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "twquote.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything a snapshot run needs besides the providers themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// JSON array or TOML `tickers = [..]` file.
    pub tickers_file: PathBuf,

    /// Used when `tickers_file` does not exist.
    pub fallback_tickers: Vec<String>,

    /// Snapshot document to write; the default is where the web page reads it.
    pub output: PathBuf,

    pub profile: IndicatorProfile,

    /// How much history to request per ticker.
    pub lookback: Lookback,

    /// Bars kept per record, newest first.
    pub history_len: usize,

    /// Worker threads; `None` uses the rayon default.
    pub threads: Option<usize>,

    /// Look up foreign/trust net flow for Taiwan tickers.
    pub institutional_flow: bool,

    /// Look up the next earnings date.
    pub earnings: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            tickers_file: PathBuf::from("stock_list.json"),
            fallback_tickers: ticker_list::default_fallback(),
            output: PathBuf::from("public/stocks.json"),
            profile: IndicatorProfile::default(),
            lookback: Lookback::default(),
            history_len: DEFAULT_HISTORY_LEN,
            threads: None,
            institutional_flow: true,
            earnings: true,
        }
    }
}

impl SnapshotConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given; otherwise `twquote.toml` if present, else defaults.
    ///
    /// An explicitly named file that is missing is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_len == 0 {
            return Err(ConfigError::Invalid("history_len must be at least 1".into()));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be at least 1".into()));
        }
        self.lookback
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
