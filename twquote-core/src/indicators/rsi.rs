//! Relative Strength Index (RSI).
//!
//! Exponential smoothing of gains and losses with centre of mass `period - 1`
//! (alpha = 1 / period), unadjusted and seeded with the first change.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! A zero avg_loss is replaced by `EPSILON`: all-gain windows read just under
//! 100, flat windows read 0.
//! Lookback: 1 (the first bar has no change).

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::ema::{com_alpha, ema_of_series};
use crate::indicators::numeric::safe_div;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();
        rsi_of_series(&closes, self.period)
    }
}

pub fn rsi_of_series(closes: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let changes: Vec<Option<f64>> = std::iter::once(None)
        .chain(closes.windows(2).map(|w| Some(w[1]? - w[0]?)))
        .take(closes.len())
        .collect();

    let gains: Vec<Option<f64>> = changes.iter().map(|c| c.map(|c| c.max(0.0))).collect();
    let losses: Vec<Option<f64>> = changes.iter().map(|c| c.map(|c| (-c).max(0.0))).collect();

    let alpha = com_alpha(period.saturating_sub(1));
    let avg_gain = ema_of_series(&gains, alpha);
    let avg_loss = ema_of_series(&losses, alpha);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| {
            let rs = safe_div((*g)?, (*l)?);
            Some(100.0 - 100.0 / (1.0 + rs))
        })
        .collect()
}
