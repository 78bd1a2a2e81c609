//! Institutional investor net flow (Taiwan market).
//!
//! The TWSE "T86" daily report lists, per listed security, the net buy/sell
//! share volume of foreign investors and of investment trusts. Volumes are
//! reported here in round lots (1 lot = 1000 shares, truncated toward zero).
//!
//! A code missing from a day's table is unknown, not zero.

use super::provider::DataError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const T86_URL: &str = "https://www.twse.com.tw/rwd/zh/fund/T86";

/// Shares per round lot on TWSE/TPEx.
pub const SHARES_PER_LOT: i64 = 1000;

/// Net volumes for one code on one trading day, in round lots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstitutionalFlow {
    pub foreign_net: i64,
    pub trust_net: i64,
}

/// One trading day of institutional flows, keyed by raw code (e.g. `2330`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowTable {
    entries: HashMap<String, InstitutionalFlow>,
}

impl FlowTable {
    pub fn get(&self, code: &str) -> Option<InstitutionalFlow> {
        self.entries.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, InstitutionalFlow)> for FlowTable {
    fn from_iter<I: IntoIterator<Item = (String, InstitutionalFlow)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Source of daily institutional flow tables.
pub trait FlowProvider: Send + Sync {
    fn fetch_day(&self, date: NaiveDate) -> Result<FlowTable, DataError>;
}

#[derive(Debug, Deserialize)]
struct T86Response {
    stat: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<String>>,
}

/// TWSE T86 report client.
pub struct TwseFlowProvider {
    client: reqwest::blocking::Client,
}

impl TwseFlowProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn url(date: NaiveDate) -> String {
        format!(
            "{T86_URL}?date={}&selectType=ALLBUT0999&response=json",
            date.format("%Y%m%d")
        )
    }

    fn parse(resp: T86Response) -> Result<FlowTable, DataError> {
        if resp.stat != "OK" {
            // Holidays and not-yet-published days come back with a message instead of data
            return Err(DataError::Other(format!("T86 report unavailable: {}", resp.stat)));
        }

        let find = |needles: &[&str]| {
            resp.fields
                .iter()
                .position(|f| needles.iter().any(|n| f.contains(n)))
        };
        let foreign_col = find(&["外陸資買賣超股數", "外資及陸資買賣超股數", "外資買賣超股數"])
            .ok_or_else(|| DataError::ResponseFormatChanged("T86: no foreign net column".into()))?;
        let trust_col = find(&["投信買賣超股數"])
            .ok_or_else(|| DataError::ResponseFormatChanged("T86: no trust net column".into()))?;

        let table = resp
            .data
            .iter()
            .filter_map(|row| {
                let code = row.first()?.trim().to_string();
                let foreign = parse_shares(row.get(foreign_col)?)?;
                let trust = parse_shares(row.get(trust_col)?)?;
                Some((
                    code,
                    InstitutionalFlow {
                        foreign_net: foreign / SHARES_PER_LOT,
                        trust_net: trust / SHARES_PER_LOT,
                    },
                ))
            })
            .collect();
        Ok(table)
    }
}

/// Parse a share count such as `"-1,234,000"`.
fn parse_shares(raw: &str) -> Option<i64> {
    raw.trim().replace(',', "").parse().ok()
}

impl FlowProvider for TwseFlowProvider {
    fn fetch_day(&self, date: NaiveDate) -> Result<FlowTable, DataError> {
        let resp = self
            .client
            .get(Self::url(date))
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(DataError::Other(format!("HTTP {} for T86 {date}", resp.status())));
        }
        let body: T86Response = resp
            .json()
            .map_err(|e| DataError::ResponseFormatChanged(format!("T86: {e}")))?;
        let table = Self::parse(body)?;
        debug!(%date, codes = table.len(), "fetched institutional flows");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "stat": "OK",
        "date": "20240102",
        "fields": [
            "證券代號", "證券名稱",
            "外陸資買進股數(不含外資自營商)", "外陸資賣出股數(不含外資自營商)", "外陸資買賣超股數(不含外資自營商)",
            "外資自營商買進股數", "外資自營商賣出股數", "外資自營商買賣超股數",
            "投信買進股數", "投信賣出股數", "投信買賣超股數"
        ],
        "data": [
            ["2330", "台積電          ", "20,000,000", "25,500,400", "-5,500,400", "0", "0", "0", "1,200,000", "200,000", "1,000,000"],
            ["2454  ", "聯發科", "3,000,999", "0", "3,000,999", "0", "0", "0", "0", "1,500", "-1,500"],
            ["0050", "元大台灣50", "bad", "0", "n/a", "0", "0", "0", "0", "0", "0"]
        ]
    }"#;

    #[test]
    fn parses_net_columns_into_round_lots() {
        let resp: T86Response = serde_json::from_str(SAMPLE).unwrap();
        let table = TwseFlowProvider::parse(resp).unwrap();
        assert_eq!(
            table.get("2330"),
            Some(InstitutionalFlow {
                foreign_net: -5500,
                trust_net: 1000
            })
        );
        // Codes are trimmed; lots truncate toward zero
        assert_eq!(
            table.get("2454"),
            Some(InstitutionalFlow {
                foreign_net: 3000,
                trust_net: -1
            })
        );
        // Unparseable rows are left out (unknown), not zeroed
        assert_eq!(table.get("0050"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn non_ok_stat_is_an_error() {
        let resp: T86Response =
            serde_json::from_str(r#"{"stat":"很抱歉，沒有符合條件的資料!"}"#).unwrap();
        assert!(TwseFlowProvider::parse(resp).is_err());
    }

    #[test]
    fn url_uses_compact_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(TwseFlowProvider::url(date).contains("date=20240102&"));
    }
}
