//! twquote core: bar series, indicator engine, data providers and snapshot records.
//!
//! - Domain types (bars, series, ticker resolution)
//! - Indicators (MA, KD, MACD, RSI) behind the `Indicator` trait
//! - Indicator engine with a per-profile window gate
//! - Price, earnings and institutional-flow providers
//! - Snapshot record model and assembly

pub mod components;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod snapshot;
