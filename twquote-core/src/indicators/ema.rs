//! Exponential Moving Average (EMA).
//!
//! Recursive, unadjusted: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1]
//! Seed: the first present sample.
//! A missing sample has no value and leaves the recursion state unchanged.
//! Lookback: 0.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

/// Smoothing factor for a span: `2 / (span + 1)`.
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Smoothing factor for a centre of mass: `1 / (com + 1)`.
pub fn com_alpha(com: usize) -> f64 {
    1.0 / (com as f64 + 1.0)
}

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, span_alpha(self.span))
    }
}

/// Compute EMA values from a pre-extracted optional series.
/// Used by composed indicators (MACD, RSI) that need the EMA of derived columns.
pub fn ema_of_series(values: &[Option<f64>], alpha: f64) -> Vec<Option<f64>> {
    values
        .iter()
        .scan(None::<f64>, |state, &x| {
            let out = x.map(|x| {
                let next = match *state {
                    Some(prev) => alpha * x + (1.0 - alpha) * prev,
                    None => x,
                };
                *state = Some(next);
                next
            });
            Some(out)
        })
        .collect()
}
