//! Snapshot document writer.
//!
//! The document is written to a sibling temp file and renamed into place, so
//! a reader never sees a half-written snapshot.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use twquote_core::snapshot::StockRecord;

/// Failure of the final write: the only error that fails a run.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Serialize records as a JSON array.
pub fn to_json(records: &[StockRecord]) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write the snapshot to `path`, creating parent directories as needed.
pub fn write_snapshot(path: &Path, records: &[StockRecord]) -> Result<(), OutputError> {
    let json = to_json(records)?;
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, json.as_bytes()).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;

    info!(path = %path.display(), records = records.len(), bytes = json.len(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use twquote_core::domain::Ticker;
    use twquote_core::snapshot::{failure_record, no_data_record};

    #[test]
    fn writes_array_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public").join("data.json");
        let records = vec![no_data_record(&Ticker::parse("9999")), failure_record("BAD")];
        write_snapshot(&path, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Vec<StockRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, records);
        // Non-ASCII messages are written as-is
        assert!(text.contains("查無資料"));
        assert!(!dir.path().join("public").join("data.json.tmp").exists());
    }

    #[test]
    fn overwrites_existing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "stale").unwrap();
        write_snapshot(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn unwritable_target_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go
        let path = dir.path().join("data.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();
        assert!(matches!(
            write_snapshot(&path, &[]),
            Err(OutputError::Io { .. })
        ));
    }
}
