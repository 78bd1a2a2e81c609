//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).
//! A window containing a missing close has no value.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// SMA column with an explicit column name (e.g. `"ma20"`).
    pub fn named(name: impl Into<String>, period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: name.into(),
        }
    }

    pub fn new(period: usize) -> Self {
        Self::named(format!("ma{period}"), period)
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();
        rolling_mean(&closes, self.period)
    }
}

/// Rolling mean over a trailing window, inclusive of the current position.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];
    if period == 0 || n < period {
        return result;
    }

    // Rolling sum over present values, plus a count of missing ones in the window.
    let mut sum = 0.0;
    let mut missing = 0usize;
    for i in 0..n {
        match values[i] {
            Some(v) => sum += v,
            None => missing += 1,
        }
        if i >= period {
            match values[i - period] {
                Some(v) => sum -= v,
                None => missing -= 1,
            }
        }
        if i + 1 >= period && missing == 0 {
            result[i] = Some(sum / period as f64);
        }
    }

    result
}
