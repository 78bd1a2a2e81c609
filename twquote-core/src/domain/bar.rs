//! Bar and Series: the fundamental market data units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV bar for a single symbol.
///
/// Price fields are `None` when the provider omitted them. Indicators that
/// depend on a missing price at a given position produce no value there; they
/// never substitute a stale or default price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: u64,
}

impl Bar {
    /// Bar with every price present.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarError {
    #[error("bars out of order at index {index}: {prev} is not before {next}")]
    OutOfOrder {
        index: usize,
        prev: NaiveDate,
        next: NaiveDate,
    },
}

/// Ordered bar history for one ticker.
///
/// Dates are strictly ascending and unique. The indicator engine relies on
/// this ordering: the KD fold and every EMA are left folds over the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series from bars that must already be strictly ascending by date.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, BarError> {
        if let Some(index) = bars.windows(2).position(|w| w[0].date >= w[1].date) {
            return Err(BarError::OutOfOrder {
                index: index + 1,
                prev: bars[index].date,
                next: bars[index + 1].date,
            });
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// Canonicalize provider output: stable sort by date, keep the first bar of
    /// a duplicated date.
    pub fn canonicalize(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_bar() -> Bar {
        Bar::new(day(2), 100.0, 105.0, 98.0, 103.0, 50_000)
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let bars = vec![sample_bar(), sample_bar()];
        let err = Series::new("2330.TW", bars).unwrap_err();
        assert_eq!(
            err,
            BarError::OutOfOrder {
                index: 1,
                prev: day(2),
                next: day(2)
            }
        );
    }

    #[test]
    fn canonicalize_sorts_and_keeps_first_duplicate() {
        let mut dup = Bar::new(day(3), 1.0, 1.0, 1.0, 1.0, 1);
        dup.volume = 7;
        let bars = vec![
            Bar::new(day(4), 1.0, 1.0, 1.0, 4.0, 1),
            dup,
            Bar::new(day(3), 1.0, 1.0, 1.0, 3.0, 9),
            Bar::new(day(2), 1.0, 1.0, 1.0, 2.0, 1),
        ];
        let series = Series::canonicalize("NVDA", bars);
        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![day(2), day(3), day(4)]);
        assert_eq!(series.bars()[1].volume, 7);
        assert!(Series::new("NVDA", series.bars().to_vec()).is_ok());
    }

    #[test]
    fn bar_serialization_keeps_missing_prices() {
        let mut bar = sample_bar();
        bar.low = None;
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
