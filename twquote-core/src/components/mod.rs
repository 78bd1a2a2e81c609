//! Component traits.
//!
//! The indicator trait for precomputed numeric series, the column container
//! the engine fills, and the per-bar view read by the snapshot stage.

pub mod indicator;

pub use indicator::{column, Indicator, IndicatorSet, IndicatorValues, KD_NEUTRAL};
