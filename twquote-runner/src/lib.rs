//! twquote runner: snapshot orchestration on top of `twquote-core`.
//!
//! This crate provides:
//! - Run configuration (TOML, with defaults for every field)
//! - Per-ticker pipeline with failure isolation
//! - Parallel batch over the ticker list, order preserved
//! - Shared per-date institutional flow cache
//! - Atomic JSON snapshot writer

pub mod config;
pub mod flow_cache;
pub mod output;
pub mod pipeline;

pub use config::{ConfigError, SnapshotConfig, DEFAULT_CONFIG_FILE};
pub use flow_cache::FlowCache;
pub use output::{to_json, write_snapshot, OutputError};
pub use pipeline::{PipelineError, PriceSource, RunSummary, Snapshot, SnapshotRunner, Sources};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn runner_is_send_sync() {
        assert_send::<SnapshotRunner>();
        assert_sync::<SnapshotRunner>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<SnapshotConfig>();
        assert_sync::<SnapshotConfig>();
    }
}
