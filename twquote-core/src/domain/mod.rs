//! Domain types: daily bars, ordered series, ticker resolution

pub mod bar;
pub mod ticker;

pub use bar::{Bar, BarError, Series};
pub use ticker::{clean_code, Currency, Market, Ticker};
