//! Data providers: price bars, earnings dates, institutional flow, ticker lists

pub mod circuit_breaker;
pub mod csv_import;
pub mod flow;
pub mod provider;
pub mod synthetic;
pub mod ticker_list;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use flow::{FlowProvider, FlowTable, InstitutionalFlow, TwseFlowProvider};
pub use provider::{DataError, DataProvider, EarningsProvider, FetchResult, Lookback};
pub use synthetic::{generate_synthetic_bars, SyntheticProvider};
pub use ticker_list::TickerError;
pub use yahoo::YahooProvider;
