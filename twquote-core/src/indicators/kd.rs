//! Stochastic oscillator KD.
//!
//! RSV over a trailing window (default 9 bars):
//!   RSV[t] = (close[t] - lowest low) / (highest high - lowest low) * 100
//! with `EPSILON` in place of a zero-width range.
//!
//! K and D are an explicit left fold over RSV starting from (50, 50):
//!   K[t] = 2/3 * K[t-1] + 1/3 * RSV[t]
//!   D[t] = 2/3 * D[t-1] + 1/3 * K[t]
//! An undefined or non-finite RSV resets both lines to 50.
//!
//! Two lines (separate Indicator instances): K and D. Each value depends on the
//! whole history before it, so the series must be in ascending date order.

use crate::components::indicator::{column, Indicator, KD_NEUTRAL};
use crate::domain::Bar;
use crate::indicators::numeric::safe_div;

pub const DEFAULT_RSV_PERIOD: usize = 9;

/// Which line of the stochastic to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdLine {
    K,
    D,
}

/// Fold state carried from one bar to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KdState {
    pub k: f64,
    pub d: f64,
}

impl KdState {
    /// Virtual state before the first bar.
    pub const SEED: KdState = KdState {
        k: KD_NEUTRAL,
        d: KD_NEUTRAL,
    };

    /// Advance by one bar.
    pub fn step(self, rsv: Option<f64>) -> KdState {
        match rsv.filter(|v| v.is_finite()) {
            Some(rsv) => {
                let k = (2.0 / 3.0) * self.k + (1.0 / 3.0) * rsv;
                let d = (2.0 / 3.0) * self.d + (1.0 / 3.0) * k;
                KdState { k, d }
            }
            None => KdState::SEED,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Kd {
    period: usize,
    line: KdLine,
}

impl Kd {
    pub fn new(period: usize, line: KdLine) -> Self {
        assert!(period >= 1, "KD period must be >= 1");
        Self { period, line }
    }

    pub fn k() -> Self {
        Self::new(DEFAULT_RSV_PERIOD, KdLine::K)
    }

    pub fn d() -> Self {
        Self::new(DEFAULT_RSV_PERIOD, KdLine::D)
    }
}

impl Indicator for Kd {
    fn name(&self) -> &str {
        match self.line {
            KdLine::K => column::K,
            KdLine::D => column::D,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let rsv = raw_stochastic(bars, self.period);
        kd_fold(&rsv, KdState::SEED)
            .into_iter()
            .map(|s| match self.line {
                KdLine::K => Some(s.k),
                KdLine::D => Some(s.d),
            })
            .collect()
    }
}

/// Raw stochastic value per bar. `None` during warmup or when the window has a
/// missing high, low or current close.
pub fn raw_stochastic(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; bars.len()];
    if period == 0 {
        return result;
    }

    for i in (period.saturating_sub(1))..bars.len() {
        let window = &bars[(i + 1 - period)..=i];
        let lows: Option<Vec<f64>> = window.iter().map(|b| b.low).collect();
        let highs: Option<Vec<f64>> = window.iter().map(|b| b.high).collect();
        let (Some(lows), Some(highs), Some(close)) = (lows, highs, bars[i].close) else {
            continue;
        };
        let low_min = lows.into_iter().fold(f64::INFINITY, f64::min);
        let high_max = highs.into_iter().fold(f64::NEG_INFINITY, f64::max);
        result[i] = Some(safe_div(close - low_min, high_max - low_min) * 100.0);
    }

    result
}

/// Left fold of RSV into K/D, one state per bar (the initial state is not emitted).
pub fn kd_fold(rsv: &[Option<f64>], initial: KdState) -> Vec<KdState> {
    rsv.iter()
        .scan(initial, |state, &r| {
            *state = state.step(r);
            Some(*state)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn warmup_positions_are_neutral() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let k = Kd::k().compute(&bars);
        let d = Kd::d().compute(&bars);
        assert!(k.iter().all(|v| *v == Some(50.0)));
        assert!(d.iter().all(|v| *v == Some(50.0)));
    }

    #[test]
    fn rsv_uses_window_extremes() {
        // make_bars: high = max(open, close) + 1, low = min(open, close) - 1
        // Window of 3 ending at index 2: closes 10, 12, 11
        // lows: 9, 9, 10 → 9 ; highs: 11, 13, 13 → 13
        // RSV = (11 - 9) / (13 - 9) * 100 = 50
        let bars = make_bars(&[10.0, 12.0, 11.0]);
        let rsv = raw_stochastic(&bars, 3);
        assert_eq!(&rsv[..2], &[None, None]);
        assert_approx(rsv[2].unwrap(), 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_window_uses_epsilon_denominator() {
        let flat: Vec<Bar> = make_bars(&[5.0; 4])
            .into_iter()
            .map(|mut b| {
                b.high = Some(5.0);
                b.low = Some(5.0);
                b
            })
            .collect();
        let rsv = raw_stochastic(&flat, 3);
        assert_eq!(rsv[3], Some(0.0));
    }

    #[test]
    fn fold_recursion_known_values() {
        let states = kd_fold(&[Some(80.0), Some(20.0)], KdState::SEED);
        // K1 = 2/3*50 + 1/3*80 = 60, D1 = 2/3*50 + 1/3*60 = 53.333...
        assert_approx(states[0].k, 60.0, DEFAULT_EPSILON);
        assert_approx(states[0].d, 160.0 / 3.0, DEFAULT_EPSILON);
        // K2 = 2/3*60 + 1/3*20 = 46.666..., D2 = 2/3*53.333 + 1/3*46.666
        assert_approx(states[1].k, 140.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(states[1].d, (2.0 / 3.0) * (160.0 / 3.0) + (1.0 / 3.0) * (140.0 / 3.0), DEFAULT_EPSILON);
    }

    #[test]
    fn undefined_or_non_finite_rsv_resets_to_seed() {
        let states = kd_fold(
            &[Some(100.0), None, Some(100.0), Some(f64::INFINITY), Some(f64::NAN)],
            KdState::SEED,
        );
        assert_eq!(states[1], KdState::SEED);
        assert_eq!(states[3], KdState::SEED);
        assert_eq!(states[4], KdState::SEED);
        // After a reset the fold restarts from 50
        assert_eq!(states[2], states[0]);
    }

    #[test]
    fn initial_state_is_a_parameter() {
        let from_zero = kd_fold(&[Some(30.0)], KdState { k: 0.0, d: 0.0 });
        assert_approx(from_zero[0].k, 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn missing_low_in_window_leaves_rsv_undefined() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        bars[1].low = None;
        let rsv = raw_stochastic(&bars, 3);
        assert!(rsv[2].is_none());
        assert!(rsv[3].is_none());
    }
}
