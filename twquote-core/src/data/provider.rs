//! Data provider traits and structured error types.
//!
//! The DataProvider trait abstracts over price sources (Yahoo Finance, CSV
//! import, synthetic) so we can swap implementations and mock for tests.
//! The earnings lookup is a separate, best-effort trait.

use crate::domain::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Structured error types for data operations.
///
/// These are designed to be displayable in log lines and per-ticker records.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("provider {provider} is unavailable")]
    ProviderUnavailable { provider: String },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// True when the provider simply has no bars for the symbol.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::SymbolNotFound { .. })
    }
}

/// How much history to request.
///
/// Either a number of calendar days ending today, or a named range in the
/// provider's vocabulary (`60d`, `3mo`, `6mo`, `1y`, `ytd`, `max`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lookback {
    Days(u32),
    Range(String),
}

impl Default for Lookback {
    fn default() -> Self {
        Lookback::Range("6mo".into())
    }
}

impl Lookback {
    /// Calendar days covered, for providers that work with date windows.
    pub fn approx_days(&self) -> u32 {
        match self {
            Lookback::Days(days) => *days,
            Lookback::Range(range) => parse_range_days(range).unwrap_or(182),
        }
    }

    /// Check a named range is one the providers understand.
    pub fn validate(&self) -> Result<(), DataError> {
        match self {
            Lookback::Days(0) => Err(DataError::ValidationError(
                "lookback must cover at least one day".into(),
            )),
            Lookback::Days(_) => Ok(()),
            Lookback::Range(range) => parse_range_days(range).map(|_| ()).ok_or_else(|| {
                DataError::ValidationError(format!(
                    "invalid lookback range '{range}' (expected e.g. 60d, 6mo, 1y, ytd, max)"
                ))
            }),
        }
    }
}

fn parse_range_days(range: &str) -> Option<u32> {
    match range {
        "ytd" => return Some(366),
        "max" => return Some(3650),
        _ => {}
    }
    let split = range.find(|c: char| !c.is_ascii_digit())?;
    let (count, unit) = range.split_at(split);
    let count: u32 = count.parse().ok().filter(|n| *n > 0)?;
    let per_unit = match unit {
        "d" => 1,
        "wk" => 7,
        "mo" => 31,
        "y" => 366,
        _ => return None,
    };
    count.checked_mul(per_unit)
}

impl FromStr for Lookback {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lookback = match s.parse::<u32>() {
            Ok(days) => Lookback::Days(days),
            Err(_) => Lookback::Range(s.to_string()),
        };
        lookback.validate()?;
        Ok(lookback)
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(days) => write!(f, "{days} days"),
            Lookback::Range(range) => write!(f, "{range}"),
        }
    }
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

/// Trait for price providers (Yahoo Finance, CSV import, etc).
///
/// Implementations handle the specifics of fetching data from a particular
/// source. A fetch that finds no bars returns `DataError::SymbolNotFound`.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for a symbol, ascending by date.
    fn fetch(&self, symbol: &str, lookback: &Lookback) -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}

/// Best-effort lookup of the next scheduled earnings date.
pub trait EarningsProvider: Send + Sync {
    fn next_earnings(&self, symbol: &str) -> Result<Option<NaiveDate>, DataError>;
}
