//! Serialized shape of the snapshot document.
//!
//! Field names are part of the output contract read by the display page, so
//! they keep their camelCase spelling.

use crate::domain::Currency;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One ticker in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: String,
    pub code: String,
    pub name: String,
    pub industry: String,
    pub currency: Currency,
    pub change: Option<f64>,
    #[serde(rename = "pctChange")]
    pub pct_change: Option<f64>,
    #[serde(rename = "earningsDate")]
    pub earnings_date: Option<NaiveDate>,
    #[serde(rename = "foreignNet")]
    pub foreign_net: Option<i64>,
    #[serde(rename = "trustNet")]
    pub trust_net: Option<i64>,
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    /// Newest bar first.
    pub history: Vec<HistoryRow>,
}

/// One bar of a record's history with its indicator fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: u64,
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub k: f64,
    pub d: f64,
    pub dif: Option<f64>,
    pub macd: Option<f64>,
    pub osc: Option<f64>,
    pub rsi6: Option<f64>,
    pub rsi14: Option<f64>,
}
