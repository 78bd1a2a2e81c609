//! Ticker resolution: raw list entries to provider symbols, market and currency.

use serde::{Deserialize, Serialize};

/// Exchange a provider symbol belongs to, as far as the snapshot cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    /// TWSE listed (`.TW`).
    TwseListed,
    /// TPEx over-the-counter (`.TWO`).
    TpexOtc,
    International,
}

impl Market {
    pub fn of_symbol(symbol: &str) -> Self {
        if symbol.ends_with(".TWO") {
            Market::TpexOtc
        } else if symbol.ends_with(".TW") {
            Market::TwseListed
        } else {
            Market::International
        }
    }

    pub fn is_taiwan(self) -> bool {
        matches!(self, Market::TwseListed | Market::TpexOtc)
    }
}

/// Quote currency of the snapshot record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Twd,
    Usd,
}

impl From<Market> for Currency {
    fn from(market: Market) -> Self {
        if market.is_taiwan() {
            Currency::Twd
        } else {
            Currency::Usd
        }
    }
}

/// One entry of the ticker list, with the provider symbols to try in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    raw: String,
    candidates: Vec<String>,
}

impl Ticker {
    /// Resolve a list entry.
    ///
    /// A bare four-digit code is a Taiwan stock: query `.TW` first, then fall
    /// back to the OTC board `.TWO`. Anything else is queried as written.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let candidates = if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
            vec![format!("{raw}.TW"), format!("{raw}.TWO")]
        } else {
            vec![raw.clone()]
        };
        Self { raw, candidates }
    }

    /// The entry as it appears in the ticker list.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Provider symbols to try, in order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The code without an exchange suffix (`2330.TW` -> `2330`).
    pub fn clean_code(&self) -> &str {
        clean_code(&self.raw)
    }
}

/// Strip a `.TWO` or `.TW` suffix.
pub fn clean_code(symbol: &str) -> &str {
    symbol
        .strip_suffix(".TWO")
        .or_else(|| symbol.strip_suffix(".TW"))
        .unwrap_or(symbol)
}
