//! Per-run memo of institutional flow tables.
//!
//! Every Taiwan ticker of a run usually shares the same latest trading date,
//! so the exchange report is downloaded once per date and shared by all
//! workers. A failed download is remembered too: its date reads as unknown
//! for the rest of the run.

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use twquote_core::data::{FlowProvider, FlowTable, InstitutionalFlow};

pub struct FlowCache {
    provider: Arc<dyn FlowProvider>,
    days: Mutex<HashMap<NaiveDate, Option<Arc<FlowTable>>>>,
}

impl FlowCache {
    pub fn new(provider: Arc<dyn FlowProvider>) -> Self {
        Self {
            provider,
            days: Mutex::new(HashMap::new()),
        }
    }

    /// Flow for `code` on `date`; `None` when unknown.
    pub fn lookup(&self, date: NaiveDate, code: &str) -> Option<InstitutionalFlow> {
        self.table(date)?.get(code)
    }

    /// The table for `date`, downloading it on first use.
    ///
    /// The lock is held across the download so concurrent workers wait for
    /// the first request instead of issuing their own.
    pub fn table(&self, date: NaiveDate) -> Option<Arc<FlowTable>> {
        let mut days = self.days.lock();
        days.entry(date)
            .or_insert_with(|| match self.provider.fetch_day(date) {
                Ok(table) => Some(Arc::new(table)),
                Err(e) => {
                    warn!(%date, error = %e, "institutional flow unavailable");
                    None
                }
            })
            .clone()
    }

    /// Number of dates requested so far.
    pub fn len(&self) -> usize {
        self.days.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
