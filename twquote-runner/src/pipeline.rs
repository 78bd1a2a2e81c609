//! Per-ticker pipeline and the parallel batch.
//!
//! Each ticker goes through: resolve candidates, fetch bars, canonicalize,
//! annotate, look up flow and earnings, assemble the record. A ticker never
//! fails the batch: missing data and errors (panics included) become error
//! records in the ticker's slot.

use crate::config::SnapshotConfig;
use crate::flow_cache::FlowCache;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use twquote_core::data::{
    CircuitBreaker, CsvProvider, DataError, DataProvider, EarningsProvider, FetchResult,
    Lookback, SyntheticProvider, TwseFlowProvider, YahooProvider,
};
use twquote_core::domain::{Market, Series, Ticker};
use twquote_core::engine::IndicatorEngine;
use twquote_core::snapshot::{
    failure_record, no_data_record, RecordBuilder, RecordExtras, StockRecord, NO_DATA_MSG,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Where price bars come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceSource {
    /// Yahoo Finance over the network (with earnings and flow lookups).
    Yahoo,
    /// `<dir>/<SYMBOL>.csv` files; no network lookups.
    Csv(PathBuf),
    /// Deterministic random walks ending on the given date; no network lookups.
    Synthetic(chrono::NaiveDate),
}

/// The collaborators a run talks to.
pub struct Sources {
    pub prices: Arc<dyn DataProvider>,
    pub earnings: Option<Arc<dyn EarningsProvider>>,
    pub flows: Option<FlowCache>,
}

impl Sources {
    /// Providers for `source`, with the optional lookups enabled per `config`.
    ///
    /// Offline sources never consult earnings or flow providers.
    pub fn build(source: &PriceSource, config: &SnapshotConfig) -> Result<Self, PipelineError> {
        let sources = match source {
            PriceSource::Yahoo => {
                let breaker = Arc::new(CircuitBreaker::default_provider());
                let yahoo = Arc::new(YahooProvider::new(breaker)?);
                let flows = if config.institutional_flow {
                    Some(FlowCache::new(Arc::new(TwseFlowProvider::new()?)))
                } else {
                    None
                };
                Sources {
                    prices: yahoo.clone(),
                    earnings: config
                        .earnings
                        .then(|| yahoo as Arc<dyn EarningsProvider>),
                    flows,
                }
            }
            PriceSource::Csv(dir) => Sources::offline(Arc::new(CsvProvider::new(dir))),
            PriceSource::Synthetic(end) => Sources::offline(Arc::new(SyntheticProvider::new(*end))),
        };
        Ok(sources)
    }

    /// Prices only.
    pub fn offline(prices: Arc<dyn DataProvider>) -> Self {
        Sources {
            prices,
            earnings: None,
            flows: None,
        }
    }
}

/// Counts of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub ok: usize,
    pub no_data: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn of(records: &[StockRecord]) -> Self {
        records.iter().fold(
            RunSummary {
                total: records.len(),
                ..Default::default()
            },
            |mut s, r| {
                match r.error_msg.as_deref() {
                    None => s.ok += 1,
                    Some(NO_DATA_MSG) => s.no_data += 1,
                    Some(_) => s.failed += 1,
                }
                s
            },
        )
    }
}

/// Records in ticker-list order plus run statistics.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<StockRecord>,
    pub summary: RunSummary,
    pub elapsed: Duration,
}

pub struct SnapshotRunner {
    sources: Sources,
    engine: IndicatorEngine,
    builder: RecordBuilder,
    lookback: Lookback,
    threads: Option<usize>,
}

impl SnapshotRunner {
    pub fn new(config: &SnapshotConfig, sources: Sources) -> Self {
        Self {
            sources,
            engine: IndicatorEngine::new(config.profile),
            builder: RecordBuilder::new(config.history_len),
            lookback: config.lookback.clone(),
            threads: config.threads,
        }
    }

    /// Process every ticker on a worker pool; output order follows `tickers`.
    pub fn run(&self, tickers: &[String]) -> Result<Snapshot, PipelineError> {
        let start = Instant::now();
        let mut pool = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.threads {
            pool = pool.num_threads(n);
        }
        let pool = pool.build()?;

        info!(
            tickers = tickers.len(),
            threads = pool.current_num_threads(),
            profile = %self.engine.profile(),
            lookback = %self.lookback,
            "snapshot run started"
        );
        let records: Vec<StockRecord> =
            pool.install(|| tickers.par_iter().map(|t| self.run_ticker(t)).collect());

        let summary = RunSummary::of(&records);
        let elapsed = start.elapsed();
        info!(
            total = summary.total,
            ok = summary.ok,
            no_data = summary.no_data,
            failed = summary.failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "snapshot run finished"
        );
        Ok(Snapshot {
            records,
            summary,
            elapsed,
        })
    }

    /// One ticker, isolated: always yields a record.
    pub fn run_ticker(&self, raw: &str) -> StockRecord {
        match catch_unwind(AssertUnwindSafe(|| self.process_ticker(raw))) {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                warn!(ticker = raw, error = %e, "ticker failed");
                failure_record(raw)
            }
            Err(_) => {
                warn!(ticker = raw, "ticker pipeline panicked");
                failure_record(raw)
            }
        }
    }

    /// Fetch and assemble one ticker.
    ///
    /// Candidates are tried in order; a not-found answer moves on to the next
    /// one, any other error aborts the ticker. An unavailable provider (tripped
    /// breaker, missing import directory) fails the ticker without a request.
    pub fn process_ticker(&self, raw: &str) -> Result<StockRecord, PipelineError> {
        let prices = &self.sources.prices;
        if !prices.is_available() {
            return Err(DataError::ProviderUnavailable {
                provider: prices.name().to_string(),
            }
            .into());
        }
        let ticker = Ticker::parse(raw);
        for symbol in ticker.candidates() {
            match prices.fetch(symbol, &self.lookback) {
                Ok(fetched) if !fetched.bars.is_empty() => {
                    return Ok(self.assemble(&ticker, fetched));
                }
                Ok(_) => debug!(ticker = raw, symbol = %symbol, "no bars"),
                Err(e) if e.is_not_found() => debug!(ticker = raw, symbol = %symbol, "symbol not found"),
                Err(e) => return Err(e.into()),
            }
        }
        info!(ticker = raw, "no data for any candidate symbol");
        Ok(no_data_record(&ticker))
    }

    fn assemble(&self, ticker: &Ticker, fetched: FetchResult) -> StockRecord {
        let series = Series::canonicalize(fetched.symbol, fetched.bars);
        let annotated = self.engine.annotate(series);
        let symbol = annotated.series.symbol.as_str();
        let extras = RecordExtras {
            flow: self.flow_for(ticker, &annotated.series),
            earnings: self.earnings_for(symbol),
        };
        info!(
            ticker = ticker.raw(),
            symbol,
            bars = annotated.series.len(),
            gated = annotated.is_gated(),
            "processed"
        );
        self.builder.build(ticker, &annotated, extras)
    }

    /// Net flow from the TWSE table; OTC and international symbols have none.
    fn flow_for(&self, ticker: &Ticker, series: &Series) -> Option<twquote_core::data::InstitutionalFlow> {
        let flows = self.sources.flows.as_ref()?;
        if Market::of_symbol(&series.symbol) != Market::TwseListed {
            return None;
        }
        let date = series.last()?.date;
        flows.lookup(date, ticker.clean_code())
    }

    fn earnings_for(&self, symbol: &str) -> Option<chrono::NaiveDate> {
        let provider = self.sources.earnings.as_ref()?;
        provider.next_earnings(symbol).unwrap_or_else(|e| {
            debug!(symbol, error = %e, "earnings date unavailable");
            None
        })
    }
}
