//! Snapshot records: the per-ticker JSON documents the run emits.

pub mod build;
pub mod industry;
pub mod record;

pub use build::{
    failure_record, no_data_record, round_to, RecordBuilder, RecordExtras, DEFAULT_HISTORY_LEN,
    FAILURE_MSG, NO_DATA_MSG,
};
pub use industry::classify;
pub use record::{HistoryRow, StockRecord};
