//! CSV import provider.
//!
//! Reads `<dir>/<SYMBOL>.csv` with header `date,open,high,low,close,volume`.
//! Empty price cells are missing values; an empty volume is 0. The lookback is
//! applied relative to the newest bar in the file, not to today.

use super::provider::{DataError, DataProvider, FetchResult, Lookback};
use crate::domain::{Bar, Series};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<u64>,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read every bar from one CSV file, ascending by date.
    pub fn read_file(path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let bars = reader
            .deserialize::<CsvRow>()
            .map(|row| row.map(Bar::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Series::canonicalize("", bars).bars().to_vec())
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, symbol: &str, lookback: &Lookback) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut bars = Self::read_file(&path)?;
        if let Some(last) = bars.last().map(|b| b.date) {
            let start = last - chrono::Duration::days(i64::from(lookback.approx_days()));
            bars.retain(|b| b.date > start);
        }
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
        self.dir.is_dir()
    }
}
