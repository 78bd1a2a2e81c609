//! twquote CLI: indicator snapshot for a list of Taiwan and international tickers.
//!
//! Commands:
//! - `snapshot`: fetch bars for every listed ticker, derive indicators, write the JSON snapshot
//! - `indicators`: compute the indicators of one CSV series and print its rows

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use twquote_core::data::{ticker_list, CsvProvider, Lookback};
use twquote_core::domain::{Series, Ticker};
use twquote_core::engine::{IndicatorEngine, IndicatorProfile};
use twquote_core::snapshot::{RecordBuilder, RecordExtras};
use twquote_runner::{write_snapshot, PriceSource, SnapshotConfig, SnapshotRunner, Sources};

#[derive(Parser)]
#[command(
    name = "twquote",
    about = "twquote: MA/KD/MACD/RSI snapshot for Taiwan and international stocks"
)]
struct Cli {
    /// More log output (-v debug, -vv trace). Without it RUST_LOG applies, default info.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the snapshot document for every ticker in the list.
    Snapshot {
        /// TOML config file. Defaults to ./twquote.toml when present.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Ticker list (JSON array or TOML `tickers = [..]`).
        #[arg(long)]
        tickers: Option<PathBuf>,

        /// Output JSON path.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Indicator profile: standard or extended.
        #[arg(long)]
        profile: Option<IndicatorProfile>,

        /// History to request: days (e.g. 200) or a range (60d, 6mo, 1y).
        #[arg(long)]
        lookback: Option<Lookback>,

        /// Read bars from <DIR>/<SYMBOL>.csv instead of Yahoo Finance.
        #[arg(long, conflicts_with = "synthetic")]
        csv_dir: Option<PathBuf>,

        /// Use deterministic synthetic bars (no network).
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Skip the institutional flow lookup.
        #[arg(long, default_value_t = false)]
        no_flows: bool,

        /// Skip the earnings date lookup.
        #[arg(long, default_value_t = false)]
        no_earnings: bool,

        /// Worker threads. Defaults to one per core.
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Compute indicators for one CSV file and print rows newest-first as JSON.
    Indicators {
        /// CSV with header date,open,high,low,close,volume.
        #[arg(long)]
        csv: PathBuf,

        /// Indicator profile: standard or extended.
        #[arg(long, default_value_t = IndicatorProfile::Extended)]
        profile: IndicatorProfile,

        /// Number of rows to print.
        #[arg(long, default_value_t = 30)]
        last: usize,
    },
}

/// Command-line values that override the config file.
struct SnapshotOverrides {
    tickers: Option<PathBuf>,
    output: Option<PathBuf>,
    profile: Option<IndicatorProfile>,
    lookback: Option<Lookback>,
    no_flows: bool,
    no_earnings: bool,
    threads: Option<usize>,
}

impl SnapshotOverrides {
    fn apply(self, config: &mut SnapshotConfig) {
        if let Some(tickers) = self.tickers {
            config.tickers_file = tickers;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if let Some(lookback) = self.lookback {
            config.lookback = lookback;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        config.institutional_flow &= !self.no_flows;
        config.earnings &= !self.no_earnings;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Snapshot {
            config,
            tickers,
            output,
            profile,
            lookback,
            csv_dir,
            synthetic,
            no_flows,
            no_earnings,
            threads,
        } => {
            let source = match (csv_dir, synthetic) {
                (Some(dir), _) => PriceSource::Csv(dir),
                (None, true) => PriceSource::Synthetic(chrono::Local::now().date_naive()),
                (None, false) => PriceSource::Yahoo,
            };
            let overrides = SnapshotOverrides {
                tickers,
                output,
                profile,
                lookback,
                no_flows,
                no_earnings,
                threads,
            };
            run_snapshot(config.as_deref(), overrides, source)
        }
        Commands::Indicators { csv, profile, last } => run_indicators(&csv, profile, last),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_snapshot(
    config_path: Option<&Path>,
    overrides: SnapshotOverrides,
    source: PriceSource,
) -> Result<()> {
    let mut config = SnapshotConfig::load(config_path).context("failed to load config")?;
    overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let tickers = ticker_list::load_or_fallback(&config.tickers_file, &config.fallback_tickers)
        .context("failed to load ticker list")?;
    if tickers.is_empty() {
        warn!(path = %config.tickers_file.display(), "ticker list is empty");
    }

    let sources = Sources::build(&source, &config).context("failed to set up data providers")?;
    let runner = SnapshotRunner::new(&config, sources);
    let snapshot = runner.run(&tickers).context("snapshot run failed")?;

    write_snapshot(&config.output, &snapshot.records)
        .with_context(|| format!("failed to write snapshot to {}", config.output.display()))?;

    info!(
        ok = snapshot.summary.ok,
        no_data = snapshot.summary.no_data,
        failed = snapshot.summary.failed,
        elapsed_ms = snapshot.elapsed.as_millis() as u64,
        output = %config.output.display(),
        "done"
    );
    Ok(())
}

fn run_indicators(path: &Path, profile: IndicatorProfile, last: usize) -> Result<()> {
    let bars = CsvProvider::read_file(path)
        .with_context(|| format!("failed to read bars from {}", path.display()))?;
    let symbol = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let engine = IndicatorEngine::new(profile);
    let annotated = engine.annotate(Series::canonicalize(symbol.clone(), bars));
    if annotated.is_gated() {
        warn!(
            bars = annotated.series.len(),
            required = profile.min_bars(),
            "not enough bars for the {profile} profile; indicator fields are empty"
        );
    }

    let record = RecordBuilder::new(last).build(
        &Ticker::parse(&symbol),
        &annotated,
        RecordExtras::default(),
    );
    let json = serde_json::to_string_pretty(&record.history)
        .context("failed to serialize indicator rows")?;
    println!("{json}");
    Ok(())
}
