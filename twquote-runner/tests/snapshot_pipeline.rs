//! Integration tests for the snapshot pipeline with mock providers.
//!
//! Tests:
//! 1. One record per ticker, in ticker-list order, whatever each ticker's outcome
//! 2. Bare Taiwan codes fall back from `.TW` to `.TWO`; an unavailable provider fails fast
//! 3. Institutional flow: TWSE-listed tickers only, one download per date
//! 4. Earnings lookups degrade to null
//! 5. History window and gate reach the records
//! 6. Synthetic source end to end, written to disk

use chrono::NaiveDate;
use parking_lot::Mutex;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use twquote_core::data::{
    DataError, DataProvider, EarningsProvider, FetchResult, FlowProvider, FlowTable,
    InstitutionalFlow, Lookback,
};
use twquote_core::domain::{Bar, Currency};
use twquote_core::snapshot::{industry, FAILURE_MSG, NO_DATA_MSG};
use twquote_runner::{
    write_snapshot, FlowCache, PriceSource, RunSummary, SnapshotConfig, SnapshotRunner, Sources,
};

// ──────────────────────────────────────────────
// Mocks
// ──────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Behaviour {
    Bars(usize),
    NotFound,
    Fail,
    Panic,
}

struct MockPrices {
    table: HashMap<String, Behaviour>,
    calls: Mutex<Vec<String>>,
    available: AtomicBool,
}

impl MockPrices {
    fn new(entries: &[(&str, Behaviour)]) -> Self {
        Self {
            table: entries.iter().map(|(s, b)| (s.to_string(), *b)).collect(),
            calls: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }
}

fn linear_bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n)
        .map(|i| {
            let c = 100.0 + i as f64;
            Bar::new(base + chrono::Duration::days(i as i64), c - 0.5, c + 1.0, c - 1.0, c, 5_000)
        })
        .collect()
}

impl DataProvider for MockPrices {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, symbol: &str, _lookback: &Lookback) -> Result<FetchResult, DataError> {
        self.calls.lock().push(symbol.to_string());
        match self.table.get(symbol).copied().unwrap_or(Behaviour::NotFound) {
            Behaviour::Bars(n) => {
                // Providers may hand back bars newest-first
                let mut bars = linear_bars(n);
                bars.reverse();
                Ok(FetchResult {
                    symbol: symbol.to_string(),
                    bars,
                })
            }
            Behaviour::NotFound => Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
            Behaviour::Fail => Err(DataError::NetworkUnreachable("connection reset".into())),
            Behaviour::Panic => panic!("provider bug for {symbol}"),
        }
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

struct MockEarnings;

impl EarningsProvider for MockEarnings {
    fn next_earnings(&self, symbol: &str) -> Result<Option<NaiveDate>, DataError> {
        match symbol {
            "NVDA" => Ok(NaiveDate::from_ymd_opt(2024, 5, 22)),
            "2330.TW" => Err(DataError::RateLimited {
                retry_after_secs: 60,
            }),
            _ => Ok(None),
        }
    }
}

struct MockFlows {
    calls: AtomicUsize,
}

impl FlowProvider for MockFlows {
    fn fetch_day(&self, _date: NaiveDate) -> Result<FlowTable, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok([
            (
                "2330".to_string(),
                InstitutionalFlow {
                    foreign_net: -5500,
                    trust_net: 1000,
                },
            ),
            (
                "NVDA".to_string(),
                InstitutionalFlow {
                    foreign_net: 1,
                    trust_net: 1,
                },
            ),
        ]
        .into_iter()
        .collect())
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn standard_prices() -> MockPrices {
    MockPrices::new(&[
        ("2330.TW", Behaviour::Bars(70)),
        ("2317.TW", Behaviour::Bars(70)),
        ("NVDA", Behaviour::Bars(70)),
        ("6488.TWO", Behaviour::Bars(40)),
        ("BOOM", Behaviour::Fail),
        ("PANIC", Behaviour::Panic),
    ])
}

fn config() -> SnapshotConfig {
    SnapshotConfig {
        threads: Some(4),
        ..Default::default()
    }
}

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ──────────────────────────────────────────────
// 1. Ordering and isolation
// ──────────────────────────────────────────────

#[test]
fn every_ticker_gets_a_record_in_order() {
    let runner = SnapshotRunner::new(&config(), Sources::offline(Arc::new(standard_prices())));
    let list = tickers(&["2330", "NVDA", "9999", "BOOM", "PANIC", "6488"]);
    let snapshot = runner.run(&list).unwrap();

    let names: Vec<&str> = snapshot.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["2330", "NVDA", "9999", "BOOM", "PANIC", "6488"]);
    assert_eq!(
        snapshot.summary,
        RunSummary {
            total: 6,
            ok: 3,
            no_data: 1,
            failed: 2,
        }
    );

    let no_data = &snapshot.records[2];
    assert!(no_data.error);
    assert_eq!(no_data.error_msg.as_deref(), Some(NO_DATA_MSG));
    assert_eq!(no_data.industry, industry::TAIWAN_LISTED);

    for failed in &snapshot.records[3..5] {
        assert!(failed.error);
        assert_eq!(failed.error_msg.as_deref(), Some(FAILURE_MSG));
        assert_eq!(failed.industry, industry::FAILED);
        assert_eq!(failed.id, failed.name);
        assert!(failed.history.is_empty());
    }
}

#[test]
fn panicking_provider_only_affects_its_ticker() {
    let runner = SnapshotRunner::new(&config(), Sources::offline(Arc::new(standard_prices())));
    let record = runner.run_ticker("PANIC");
    assert_eq!(record.error_msg.as_deref(), Some(FAILURE_MSG));
    assert!(!runner.run_ticker("NVDA").error);
}

// ──────────────────────────────────────────────
// 2. Candidate fallback
// ──────────────────────────────────────────────

#[test]
fn bare_code_falls_back_to_otc_board() {
    let prices = Arc::new(standard_prices());
    let runner = SnapshotRunner::new(&config(), Sources::offline(prices.clone()));
    let record = runner.run_ticker("6488");

    assert!(!record.error);
    assert_eq!(record.id, "6488");
    assert_eq!(record.currency, Currency::Twd);
    assert_eq!(*prices.calls.lock(), ["6488.TW", "6488.TWO"]);
}

#[test]
fn non_not_found_error_stops_candidate_search() {
    let prices = Arc::new(MockPrices::new(&[
        ("1234.TW", Behaviour::Fail),
        ("1234.TWO", Behaviour::Bars(70)),
    ]));
    let runner = SnapshotRunner::new(&config(), Sources::offline(prices.clone()));
    let record = runner.run_ticker("1234");
    assert_eq!(record.error_msg.as_deref(), Some(FAILURE_MSG));
    assert_eq!(*prices.calls.lock(), ["1234.TW"]);
}

#[test]
fn unavailable_provider_fails_every_ticker_without_requests() {
    let prices = Arc::new(standard_prices());
    prices.available.store(false, Ordering::SeqCst);
    let runner = SnapshotRunner::new(&config(), Sources::offline(prices.clone()));
    let snapshot = runner.run(&tickers(&["2330", "NVDA"])).unwrap();

    assert_eq!(snapshot.summary.failed, 2);
    assert!(snapshot
        .records
        .iter()
        .all(|r| r.error_msg.as_deref() == Some(FAILURE_MSG)));
    assert!(prices.calls.lock().is_empty());
}

// ──────────────────────────────────────────────
// 3. Institutional flow
// ──────────────────────────────────────────────

#[test]
fn flows_are_looked_up_for_taiwan_tickers_once_per_date() {
    let flows = Arc::new(MockFlows {
        calls: AtomicUsize::new(0),
    });
    let sources = Sources {
        prices: Arc::new(standard_prices()),
        earnings: None,
        flows: Some(FlowCache::new(flows.clone())),
    };
    let runner = SnapshotRunner::new(&config(), sources);
    let snapshot = runner.run(&tickers(&["2330", "2317", "NVDA", "2330.TW"])).unwrap();

    let tsmc = &snapshot.records[0];
    assert_eq!(tsmc.foreign_net, Some(-5500));
    assert_eq!(tsmc.trust_net, Some(1000));

    // Listed but absent from the table: unknown, not zero
    assert_eq!(snapshot.records[1].foreign_net, None);

    // International tickers never consult the exchange table
    assert_eq!(snapshot.records[2].foreign_net, None);

    assert_eq!(snapshot.records[3].foreign_net, Some(-5500));
    assert_eq!(flows.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn otc_tickers_skip_the_listed_flow_table() {
    let flows = Arc::new(MockFlows {
        calls: AtomicUsize::new(0),
    });
    let sources = Sources {
        prices: Arc::new(standard_prices()),
        earnings: None,
        flows: Some(FlowCache::new(flows.clone())),
    };
    let runner = SnapshotRunner::new(&config(), sources);
    let record = runner.run_ticker("6488");

    assert!(!record.error);
    assert_eq!(record.foreign_net, None);
    assert_eq!(record.trust_net, None);
    assert_eq!(flows.calls.load(Ordering::SeqCst), 0);
}

// ──────────────────────────────────────────────
// 4. Earnings
// ──────────────────────────────────────────────

#[test]
fn earnings_failures_read_as_null() {
    let sources = Sources {
        prices: Arc::new(standard_prices()),
        earnings: Some(Arc::new(MockEarnings)),
        flows: None,
    };
    let runner = SnapshotRunner::new(&config(), sources);
    let snapshot = runner.run(&tickers(&["NVDA", "2330"])).unwrap();
    assert_eq!(snapshot.records[0].earnings_date, NaiveDate::from_ymd_opt(2024, 5, 22));
    assert_eq!(snapshot.records[1].earnings_date, None);
    assert!(!snapshot.records[1].error);
}

// ──────────────────────────────────────────────
// 5. History window and gate
// ──────────────────────────────────────────────

#[test]
fn records_follow_history_len_and_profile_gate() {
    let config = SnapshotConfig {
        history_len: 10,
        ..config()
    };
    let runner = SnapshotRunner::new(&config, Sources::offline(Arc::new(standard_prices())));
    let snapshot = runner.run(&tickers(&["NVDA", "6488"])).unwrap();

    let nvda = &snapshot.records[0];
    assert_eq!(nvda.history.len(), 10);
    // Newest first, despite the provider returning bars newest-first
    assert_eq!(nvda.history[0].date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    assert_eq!(nvda.history[0].close, Some(169.0));
    assert_eq!(nvda.history[0].ma5, Some(167.0));
    assert!(nvda.history[0].rsi14.is_some());
    assert_eq!(nvda.change, Some(1.0));

    // 40 bars is below the extended gate: bars kept, indicators null
    let otc = &snapshot.records[1];
    assert!(!otc.error);
    assert_eq!(otc.history.len(), 10);
    assert!(otc.history.iter().all(|r| r.ma5.is_none() && r.k == 50.0 && r.d == 50.0));
}

// ──────────────────────────────────────────────
// 6. Synthetic end to end
// ──────────────────────────────────────────────

#[test]
fn synthetic_run_writes_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 29).unwrap();
    let config = SnapshotConfig {
        output: dir.path().join("out").join("data.json"),
        ..config()
    };
    let sources = Sources::build(&PriceSource::Synthetic(end), &config).unwrap();
    let runner = SnapshotRunner::new(&config, sources);
    let snapshot = runner.run(&tickers(&["2330", "LMT", "NVDA"])).unwrap();
    assert_eq!(snapshot.summary.ok, 3);
    assert_eq!(snapshot.records[1].industry, industry::AEROSPACE_DEFENSE);
    assert_eq!(snapshot.records[0].currency, Currency::Twd);
    assert_eq!(snapshot.records[2].currency, Currency::Usd);
    assert!(snapshot.records.iter().all(|r| r.history.len() == 30));

    write_snapshot(&config.output, &snapshot.records).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 3);
    assert_eq!(written[0]["code"], "2330");
    assert!(written[0]["history"][0]["k"].is_number());
}

// ──────────────────────────────────────────────
// Properties
// ──────────────────────────────────────────────

fn arb_ticker() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("2330".to_string()),
        Just("NVDA".to_string()),
        Just("9999".to_string()),
        Just("BOOM".to_string()),
        Just("6488".to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Output is a 1:1, order-preserving image of the ticker list.
    #[test]
    fn output_order_matches_input(list in prop::collection::vec(arb_ticker(), 0..12)) {
        let runner = SnapshotRunner::new(&config(), Sources::offline(Arc::new(standard_prices())));
        let snapshot = runner.run(&list).unwrap();
        let names: Vec<String> = snapshot.records.iter().map(|r| r.name.clone()).collect();
        prop_assert_eq!(names, list);
    }
}
