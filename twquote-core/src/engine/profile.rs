//! Indicator profiles and the window sufficiency gate.

use crate::components::indicator::{column, Indicator};
use crate::indicators::{Kd, Macd, Rsi, Sma};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named set of indicators computed together.
///
/// The profile's minimum bar count is a gate: a shorter series gets no
/// indicator columns at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorProfile {
    /// MA5, MA20, KD, MACD.
    Standard,
    /// MA5, MA20, MA60, KD, MACD, RSI6, RSI14.
    #[default]
    Extended,
}

impl IndicatorProfile {
    /// Minimum number of bars before any indicator is computed.
    pub fn min_bars(self) -> usize {
        match self {
            IndicatorProfile::Standard => 35,
            IndicatorProfile::Extended => 65,
        }
    }

    /// Whether a series of `len` bars passes the gate.
    pub fn admits(self, len: usize) -> bool {
        len >= self.min_bars()
    }

    /// Indicators in stage order: moving averages, KD, MACD, RSI.
    pub fn indicators(self) -> Vec<Box<dyn Indicator>> {
        let mut out: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::named(column::MA5, 5)),
            Box::new(Sma::named(column::MA20, 20)),
        ];
        if self == IndicatorProfile::Extended {
            out.push(Box::new(Sma::named(column::MA60, 60)));
        }
        out.push(Box::new(Kd::k()));
        out.push(Box::new(Kd::d()));
        out.push(Box::new(Macd::dif()));
        out.push(Box::new(Macd::signal()));
        out.push(Box::new(Macd::oscillator()));
        if self == IndicatorProfile::Extended {
            out.push(Box::new(Rsi::new(6)));
            out.push(Box::new(Rsi::new(14)));
        }
        out
    }
}

impl fmt::Display for IndicatorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorProfile::Standard => write!(f, "standard"),
            IndicatorProfile::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for IndicatorProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(IndicatorProfile::Standard),
            "extended" => Ok(IndicatorProfile::Extended),
            other => Err(format!(
                "unknown indicator profile '{other}'. Valid: standard, extended"
            )),
        }
    }
}
