//! Per-run configuration
//!
//! `SyncOptions` is constructed once from CLI input and is read-only for the
//! run's duration.

use std::path::PathBuf;

use crate::filter::ExtensionFilter;

/// Default retry budget for a single transfer
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Immutable configuration for one sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Local source root (backup/clean read from here, restore writes here)
    pub source_root: PathBuf,
    /// Remote container name
    pub container: String,
    pub filter: ExtensionFilter,
    /// Upload without checking remote last-modified
    pub overwrite: bool,
    /// Concurrent transfer budget, always >= 1
    pub workers: usize,
    pub verbose: bool,
    /// Attempts per transfer before the item is counted as failed
    pub max_retries: u32,
}

impl SyncOptions {
    pub fn new(source_root: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            source_root: source_root.into(),
            container: container.into(),
            filter: ExtensionFilter::default(),
            overwrite: false,
            workers: default_workers(),
            verbose: false,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_filter(mut self, filter: ExtensionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the worker budget; zero falls back to available parallelism
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 {
            default_workers()
        } else {
            workers
        };
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }
}

/// Number of workers when none is configured
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SyncOptions::new("/data", "backup");
        assert!(options.workers >= 1);
        assert!(!options.overwrite);
        assert_eq!(options.max_retries, DEFAULT_MAX_RETRIES);
        assert!(options.filter.is_empty());
    }

    #[test]
    fn test_zero_workers_falls_back() {
        let options = SyncOptions::new("/data", "backup").with_workers(0);
        assert!(options.workers >= 1);
    }

    #[test]
    fn test_explicit_workers_kept() {
        let options = SyncOptions::new("/data", "backup").with_workers(7);
        assert_eq!(options.workers, 7);
    }
}
