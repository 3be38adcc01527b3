//! Units of comparison between the local tree and the remote container
//!
//! Local files and remote objects are joined by relative path only, never by
//! identity. Relative paths are slash-normalized and never contain the
//! source root prefix.

use std::path::PathBuf;
use std::time::Duration;

use jiff::Timestamp;
use serde::Serialize;

use crate::error::Error;

/// A file under the local source root
#[derive(Debug, Clone, Serialize)]
pub struct LocalItem {
    /// Slash-normalized path relative to the source root
    pub relative: String,
    /// Absolute path on disk
    pub absolute: PathBuf,
    pub size_bytes: u64,
    /// Last write time (UTC); None if the platform cannot report it
    pub modified: Option<Timestamp>,
}

/// An object in the remote container, as reported by a flat listing or probe
#[derive(Debug, Clone, Serialize)]
pub struct RemoteItem {
    pub key: String,
    pub size_bytes: u64,
    pub last_modified: Option<Timestamp>,
}

/// A container on the account
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub name: String,
    pub last_modified: Option<Timestamp>,
}

/// Terminal state of one item's transfer attempt
///
/// Filtered-out items never reach the scheduler; `Skipped` means the item
/// was considered but the local copy was not newer than the remote copy.
#[derive(Debug)]
pub enum TransferOutcome {
    Transferred,
    Skipped,
    Failed(Error),
}

/// Aggregate result of one operation invocation
///
/// Assembled incrementally by worker completions and finalized once the
/// scheduler drains; immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Items actually transferred (or deleted, for clean)
    pub transferred: u64,
    /// Total items considered after filtering
    pub candidates: u64,
    /// Wall time for the whole run
    #[serde(skip)]
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serialization() {
        let summary = RunSummary {
            transferred: 10,
            candidates: 12,
            elapsed: Duration::from_secs(3),
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"transferred\":10"));
        assert!(json.contains("\"candidates\":12"));
    }

    #[test]
    fn test_outcome_failed_carries_error() {
        let outcome = TransferOutcome::Failed(Error::Network("reset".to_string()));
        match outcome {
            TransferOutcome::Failed(e) => assert!(!e.is_not_found()),
            _ => panic!("expected failure"),
        }
    }
}
