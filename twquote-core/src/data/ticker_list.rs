//! Ticker list: the entries a snapshot run covers, in output order.
//!
//! Stored either as a JSON array of strings (`["2330", "NVDA"]`) or as a TOML
//! file with a `tickers = [..]` key. The format is picked by file extension.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// List used when no ticker file exists.
pub const FALLBACK_TICKERS: [&str; 2] = ["2330.TW", "NVDA"];

#[derive(Debug, Error)]
pub enum TickerError {
    #[error("read ticker list {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("parse ticker list JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse ticker list TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct TickerFile {
    tickers: Vec<String>,
}

/// Load a ticker list from a `.json` or `.toml` file.
///
/// Blank entries are dropped; order and duplicates are kept as written.
pub fn load(path: &Path) -> Result<Vec<String>, TickerError> {
    let content = std::fs::read_to_string(path).map_err(|source| TickerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        from_toml(&content)
    } else {
        from_json(&content)
    }
}

/// Parse a JSON array of ticker strings.
pub fn from_json(content: &str) -> Result<Vec<String>, TickerError> {
    let tickers: Vec<String> = serde_json::from_str(content)?;
    Ok(clean(tickers))
}

/// Parse a TOML document with a `tickers` array.
pub fn from_toml(content: &str) -> Result<Vec<String>, TickerError> {
    let file: TickerFile = toml::from_str(content)?;
    Ok(clean(file.tickers))
}

/// Load `path`, or use `fallback` when the file does not exist.
///
/// A file that exists but cannot be parsed is still an error.
pub fn load_or_fallback(path: &Path, fallback: &[String]) -> Result<Vec<String>, TickerError> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            fallback = ?fallback,
            "ticker list not found, using fallback list"
        );
        return Ok(fallback.to_vec());
    }
    load(path)
}

pub fn default_fallback() -> Vec<String> {
    FALLBACK_TICKERS.iter().map(|s| s.to_string()).collect()
}

fn clean(tickers: Vec<String>) -> Vec<String> {
    tickers
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
