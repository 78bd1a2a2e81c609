//! Indicator trait, precomputed indicator columns and the per-bar view.
//!
//! Indicators are pure functions: bar history in, optional numeric series out.
//! They are computed once per series by the engine and then read per bar when
//! the snapshot is assembled.

use crate::domain::Bar;
use crate::indicators::numeric::finite;
use std::collections::HashMap;

/// Column names shared by the indicators and the snapshot rows.
pub mod column {
    pub const MA5: &str = "ma5";
    pub const MA20: &str = "ma20";
    pub const MA60: &str = "ma60";
    pub const K: &str = "k";
    pub const D: &str = "d";
    pub const DIF: &str = "dif";
    pub const MACD: &str = "macd";
    pub const OSC: &str = "osc";
    pub const RSI6: &str = "rsi6";
    pub const RSI14: &str = "rsi14";
}

/// K and D value reported when the stochastic is undefined.
pub const KD_NEUTRAL: f64 = 50.0;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce an output series of the same
/// length. `None` marks a position where the indicator is undefined (warmup or
/// missing input).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Column name (e.g., "ma20", "rsi14").
    fn name(&self) -> &str;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Container for computed indicator columns.
///
/// Every value stored here has passed the numeric-safety check: NaN and
/// infinite values are stored as `None`. An empty container means the series
/// was too short for the requested profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<Option<f64>>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named indicator column, nulling every non-finite value.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        let values = values.into_iter().map(|v| v.and_then(finite)).collect();
        self.series.insert(name.into(), values);
    }

    /// Get the indicator value at a specific bar index.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied().flatten())
    }

    /// Get the full column for a named indicator.
    pub fn get_series(&self, name: &str) -> Option<&[Option<f64>]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    /// Number of indicator columns stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Per-bar view of every known column.
    pub fn row(&self, bar_index: usize) -> IndicatorSet {
        IndicatorSet {
            ma5: self.get(column::MA5, bar_index),
            ma20: self.get(column::MA20, bar_index),
            ma60: self.get(column::MA60, bar_index),
            k: self.get(column::K, bar_index).unwrap_or(KD_NEUTRAL),
            d: self.get(column::D, bar_index).unwrap_or(KD_NEUTRAL),
            dif: self.get(column::DIF, bar_index),
            macd_signal: self.get(column::MACD, bar_index),
            oscillator: self.get(column::OSC, bar_index),
            rsi6: self.get(column::RSI6, bar_index),
            rsi14: self.get(column::RSI14, bar_index),
        }
    }
}

/// Indicator fields of one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSet {
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub k: f64,
    pub d: f64,
    pub dif: Option<f64>,
    pub macd_signal: Option<f64>,
    pub oscillator: Option<f64>,
    pub rsi6: Option<f64>,
    pub rsi14: Option<f64>,
}
