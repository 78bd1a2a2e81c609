//! Industry tag shown next to each record.

use crate::domain::{clean_code, Market};

pub const SEMICONDUCTOR: &str = "半導體業";
pub const AEROSPACE_DEFENSE: &str = "航太與國防";
pub const TAIWAN_LISTED: &str = "台灣上市櫃股票";
pub const INTERNATIONAL: &str = "美股/國際";
/// Tag of a record whose pipeline failed unexpectedly.
pub const FAILED: &str = "錯誤";

const SEMICONDUCTOR_CODES: [&str; 6] = ["2330", "2454", "3491", "TSM", "NVDA", "AMD"];
const AEROSPACE_MARKERS: [&str; 2] = ["FLY", "LMT"];

/// Classify a list entry given the market its symbol resolved to.
///
/// Rules are checked in order; the first match wins.
pub fn classify(raw: &str, market: Market) -> &'static str {
    if SEMICONDUCTOR_CODES.contains(&clean_code(raw)) {
        SEMICONDUCTOR
    } else if AEROSPACE_MARKERS.iter().any(|m| raw.contains(m)) {
        AEROSPACE_DEFENSE
    } else if market.is_taiwan() {
        TAIWAN_LISTED
    } else {
        INTERNATIONAL
    }
}
