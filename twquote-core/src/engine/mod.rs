//! Indicator engine: window gate, then the indicator stages in order.
//!
//! 1. Window sufficiency gate (profile minimum bar count)
//! 2. Moving averages
//! 3. Stochastic KD fold
//! 4. Exponential stages: MACD family, RSI
//!
//! Every stage appends its own column. Non-finite values are nulled on insert.

pub mod annotate;
pub mod profile;

pub use annotate::{AnnotatedSeries, IndicatorEngine};
pub use profile::IndicatorProfile;
