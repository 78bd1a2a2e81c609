//! Synthetic price provider.
//!
//! Deterministic random-walk bars for offline demos and development. The RNG
//! seed is the BLAKE3 hash of the symbol, so every run produces the same bars
//! for the same symbol and end date.

use super::provider::{DataError, DataProvider, FetchResult, Lookback};
use crate::domain::Bar;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    end: NaiveDate,
}

impl SyntheticProvider {
    /// Bars end on `end` (inclusive).
    pub fn new(end: NaiveDate) -> Self {
        Self { end }
    }
}

/// Generate weekday bars for `symbol` over `(end - days, end]`.
pub fn generate_synthetic_bars(symbol: &str, end: NaiveDate, days: u32) -> Vec<Bar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price: f64 = rng.gen_range(20.0..800.0);
    let mut current = end - chrono::Duration::days(i64::from(days)) + chrono::Duration::days(1);

    while current <= end {
        // Skip weekends (simple heuristic)
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(Bar::new(current, open, high, low, close, volume));

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, lookback: &Lookback) -> Result<FetchResult, DataError> {
        let bars = generate_synthetic_bars(symbol, self.end, lookback.approx_days());
        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 29).unwrap()
    }

    #[test]
    fn synthetic_data_is_deterministic() {
        let a = generate_synthetic_bars("2330.TW", end(), 90);
        let b = generate_synthetic_bars("2330.TW", end(), 90);
        assert_eq!(a, b);
        assert_ne!(a, generate_synthetic_bars("NVDA", end(), 90));
    }

    #[test]
    fn synthetic_bars_are_sane_weekdays() {
        let bars = generate_synthetic_bars("AMD", end(), 28);
        assert_eq!(bars.len(), 20);
        assert_eq!(bars.last().unwrap().date, end());
        for bar in &bars {
            let (open, high, low, close) = (
                bar.open.unwrap(),
                bar.high.unwrap(),
                bar.low.unwrap(),
                bar.close.unwrap(),
            );
            assert!(low > 0.0 && low <= open.min(close), "bad low {bar:?}");
            assert!(high >= open.max(close), "bad high {bar:?}");
            assert!(!matches!(bar.date.weekday(), Weekday::Sat | Weekday::Sun));
        }
    }

    #[test]
    fn provider_covers_requested_range() {
        let provider = SyntheticProvider::new(end());
        let result = provider.fetch("LMT", &Lookback::Range("6mo".into())).unwrap();
        assert_eq!(result.symbol, "LMT");
        assert!(result.bars.len() > 100);
    }
}
