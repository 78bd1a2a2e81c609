//! Assemble snapshot records from annotated series.

use super::industry::{self, classify};
use super::record::{HistoryRow, StockRecord};
use crate::components::IndicatorSet;
use crate::data::InstitutionalFlow;
use crate::domain::{Bar, Currency, Market, Ticker};
use crate::engine::AnnotatedSeries;
use crate::indicators::numeric::finite;
use chrono::NaiveDate;

/// Bars kept per record.
pub const DEFAULT_HISTORY_LEN: usize = 30;

/// Message of a record whose ticker returned no bars.
pub const NO_DATA_MSG: &str = "查無資料 (Yahoo Finance)";
/// Message of a record whose pipeline failed for any other reason.
pub const FAILURE_MSG: &str = "系統異常";

/// Optional per-ticker lookups; `None` is serialized as null.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecordExtras {
    pub flow: Option<InstitutionalFlow>,
    pub earnings: Option<NaiveDate>,
}

/// Builds records with a fixed trailing history window.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder {
    history_len: usize,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl RecordBuilder {
    pub fn new(history_len: usize) -> Self {
        Self { history_len }
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Record for a ticker that produced bars.
    ///
    /// `annotated.series.symbol` is the provider symbol the bars came from; it
    /// decides market and currency.
    pub fn build(&self, ticker: &Ticker, annotated: &AnnotatedSeries, extras: RecordExtras) -> StockRecord {
        let market = Market::of_symbol(&annotated.series.symbol);
        let (change, pct_change) = day_change(annotated.series.bars());
        let history = annotated
            .rows()
            .rev()
            .take(self.history_len)
            .map(|(bar, set)| history_row(bar, &set))
            .collect();

        StockRecord {
            id: ticker.clean_code().to_string(),
            code: ticker.clean_code().to_string(),
            name: ticker.raw().to_string(),
            industry: classify(ticker.raw(), market).to_string(),
            currency: Currency::from(market),
            change,
            pct_change,
            earnings_date: extras.earnings,
            foreign_net: extras.flow.map(|f| f.foreign_net),
            trust_net: extras.flow.map(|f| f.trust_net),
            error: false,
            error_msg: None,
            history,
        }
    }
}

/// Record for a ticker none of whose candidate symbols returned bars.
pub fn no_data_record(ticker: &Ticker) -> StockRecord {
    let market = ticker
        .candidates()
        .first()
        .map_or(Market::International, |s| Market::of_symbol(s));
    StockRecord {
        id: ticker.clean_code().to_string(),
        code: ticker.clean_code().to_string(),
        name: ticker.raw().to_string(),
        industry: classify(ticker.raw(), market).to_string(),
        currency: Currency::from(market),
        ..empty_error(NO_DATA_MSG)
    }
}

/// Record for a ticker whose pipeline failed, identified only by the raw entry.
pub fn failure_record(raw: &str) -> StockRecord {
    let market = Ticker::parse(raw)
        .candidates()
        .first()
        .map_or(Market::International, |s| Market::of_symbol(s));
    StockRecord {
        id: raw.to_string(),
        code: raw.to_string(),
        name: raw.to_string(),
        industry: industry::FAILED.to_string(),
        currency: Currency::from(market),
        ..empty_error(FAILURE_MSG)
    }
}

fn empty_error(msg: &str) -> StockRecord {
    StockRecord {
        id: String::new(),
        code: String::new(),
        name: String::new(),
        industry: String::new(),
        currency: Currency::Usd,
        change: None,
        pct_change: None,
        earnings_date: None,
        foreign_net: None,
        trust_net: None,
        error: true,
        error_msg: Some(msg.to_string()),
        history: Vec::new(),
    }
}

/// Round to `places` decimals, exact halves to even.
pub fn round_to(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round_ties_even() / scale
}

fn round2(v: Option<f64>) -> Option<f64> {
    v.map(|v| round_to(v, 2))
}

/// Last close minus previous close, and the same as a percentage.
///
/// A single bar has zero change. A missing close on either side is unknown.
fn day_change(bars: &[Bar]) -> (Option<f64>, Option<f64>) {
    match bars {
        [] => (None, None),
        [_] => (Some(0.0), Some(0.0)),
        [.., prev, last] => match (prev.close, last.close) {
            (Some(prev), Some(last)) => {
                let change = last - prev;
                let pct = finite(change / prev * 100.0);
                (Some(round_to(change, 2)), round2(pct))
            }
            _ => (None, None),
        },
    }
}

fn history_row(bar: &Bar, set: &IndicatorSet) -> HistoryRow {
    HistoryRow {
        date: bar.date,
        open: round2(bar.open),
        high: round2(bar.high),
        low: round2(bar.low),
        close: round2(bar.close),
        volume: bar.volume,
        ma5: round2(set.ma5),
        ma20: round2(set.ma20),
        ma60: round2(set.ma60),
        k: round_to(set.k, 1),
        d: round_to(set.d, 1),
        dif: round2(set.dif),
        macd: round2(set.macd_signal),
        osc: round2(set.oscillator),
        rsi6: round2(set.rsi6),
        rsi14: round2(set.rsi14),
    }
}
