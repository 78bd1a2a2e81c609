//! MACD family.
//!
//! DIF    = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(DIF, signal span)
//! osc    = DIF - signal
//!
//! Three lines (separate Indicator instances), default spans 12 / 26 / 9.
//! Every EMA uses the span form, seeded with its first sample.

use crate::components::indicator::{column, Indicator};
use crate::domain::Bar;
use crate::indicators::ema::{ema_of_series, span_alpha};

/// Which line of the MACD family to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Dif,
    Signal,
    Oscillator,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD spans must be >= 1");
        assert!(fast < slow, "MACD fast span must be shorter than slow span");
        Self {
            fast,
            slow,
            signal,
            line,
        }
    }

    pub fn dif() -> Self {
        Self::new(12, 26, 9, MacdLine::Dif)
    }

    pub fn signal() -> Self {
        Self::new(12, 26, 9, MacdLine::Signal)
    }

    pub fn oscillator() -> Self {
        Self::new(12, 26, 9, MacdLine::Oscillator)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        match self.line {
            MacdLine::Dif => column::DIF,
            MacdLine::Signal => column::MACD,
            MacdLine::Oscillator => column::OSC,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();
        let lines = macd_lines(&closes, self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Dif => lines.dif,
            MacdLine::Signal => lines.signal,
            MacdLine::Oscillator => lines.oscillator,
        }
    }
}

/// All three MACD lines for one close series.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub dif: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub oscillator: Vec<Option<f64>>,
}

pub fn macd_lines(closes: &[Option<f64>], fast: usize, slow: usize, signal: usize) -> MacdLines {
    let ema_fast = ema_of_series(closes, span_alpha(fast));
    let ema_slow = ema_of_series(closes, span_alpha(slow));

    let dif: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_of_series(&dif, span_alpha(signal));
    let oscillator = dif
        .iter()
        .zip(&signal_line)
        .map(|(d, s)| Some((*d)? - (*s)?))
        .collect();

    MacdLines {
        dif,
        signal: signal_line,
        oscillator,
    }
}
