//! Change detection and per-transfer attempt bounds
//!
//! The policy answers two questions for a single local/remote pair: does
//! this item need a transfer at all, and how long may one transfer take
//! before it is abandoned.

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::item::{LocalItem, RemoteItem};
use crate::retry::{RetryConfig, is_retryable_error, retry_with_backoff};

/// Margin multiplied onto the theoretical transfer time so slow links are
/// not erroneously aborted
const DEADLINE_SAFETY_FACTOR: f64 = 5.0;

/// How a single transfer attempt is bounded
///
/// Either a per-attempt deadline computed from the item size and a
/// configured link speed, or a bounded retry count with exponential backoff.
/// Both are valid policies; retries are the default.
#[derive(Debug, Clone, Copy)]
pub enum AttemptBudget {
    /// One attempt, abandoned after the computed per-size deadline
    Deadline { speed_mbps: f64 },
    /// Up to `max_attempts` attempts with exponential backoff from 5s
    Retries { max_attempts: u32 },
}

/// Decides whether a transfer is required and bounds each attempt
#[derive(Debug, Clone, Copy)]
pub struct TransferPolicy {
    pub budget: AttemptBudget,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            budget: AttemptBudget::Retries { max_attempts: 3 },
        }
    }
}

impl TransferPolicy {
    pub fn with_retries(max_attempts: u32) -> Self {
        Self {
            budget: AttemptBudget::Retries {
                max_attempts: max_attempts.max(1),
            },
        }
    }

    pub fn with_deadline(speed_mbps: f64) -> Self {
        Self {
            budget: AttemptBudget::Deadline { speed_mbps },
        }
    }

    /// Does the local file need to be uploaded over the remote object?
    ///
    /// True unconditionally when `overwrite` is set or the remote object does
    /// not exist. Otherwise true iff the local last-write time is strictly
    /// newer than the remote last-modified time, compared at second
    /// resolution in UTC; equal timestamps skip. A remote object with no
    /// last-modified time cannot prove the local copy unchanged, so it is
    /// re-uploaded.
    pub fn needs_upload(
        &self,
        local: &LocalItem,
        remote: Option<&RemoteItem>,
        overwrite: bool,
    ) -> bool {
        if overwrite {
            return true;
        }
        let Some(remote) = remote else {
            return true;
        };
        match (local.modified, remote.last_modified) {
            (Some(local_ts), Some(remote_ts)) => local_ts.as_second() > remote_ts.as_second(),
            _ => true,
        }
    }

    /// Per-attempt deadline for a transfer of `size_bytes` over a link of
    /// `speed_mbps` megabytes per second, with a 5x safety factor, rounded
    /// to whole seconds, floored at one second.
    pub fn compute_timeout(size_bytes: u64, speed_mbps: f64) -> Duration {
        let bits = size_bytes as f64 * 8.0;
        let theoretical_secs = bits / (speed_mbps * 1024.0 * 1024.0);
        let bounded = (theoretical_secs * DEADLINE_SAFETY_FACTOR).round().max(1.0);
        Duration::from_secs(bounded as u64)
    }

    /// Run one transfer operation under this policy's attempt budget
    ///
    /// A timed-out or exhausted-retry attempt surfaces as an error for this
    /// item only; the caller decides what that means for the run.
    pub async fn execute<T, F, Fut>(&self, size_bytes: u64, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.budget {
            AttemptBudget::Retries { max_attempts } => {
                let config = RetryConfig {
                    max_attempts,
                    ..RetryConfig::default()
                };
                retry_with_backoff(&config, operation, is_retryable_error).await
            }
            AttemptBudget::Deadline { speed_mbps } => {
                let deadline = Self::compute_timeout(size_bytes, speed_mbps);
                tokio::time::timeout(deadline, operation())
                    .await
                    .map_err(|_| {
                        Error::Network(format!(
                            "transfer deadline of {}s exceeded",
                            deadline.as_secs()
                        ))
                    })?
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use jiff::Timestamp;

    use super::*;

    fn local_at(second: i64) -> LocalItem {
        LocalItem {
            relative: "a.txt".to_string(),
            absolute: PathBuf::from("/tmp/a.txt"),
            size_bytes: 10,
            modified: Some(Timestamp::from_second(second).unwrap()),
        }
    }

    fn remote_at(second: i64) -> RemoteItem {
        RemoteItem {
            key: "a.txt".to_string(),
            size_bytes: 10,
            last_modified: Some(Timestamp::from_second(second).unwrap()),
        }
    }

    #[test]
    fn test_needs_upload_when_remote_absent() {
        let policy = TransferPolicy::default();
        assert!(policy.needs_upload(&local_at(100), None, false));
    }

    #[test]
    fn test_needs_upload_when_overwrite() {
        let policy = TransferPolicy::default();
        // Overwrite wins even when the remote copy is newer
        assert!(policy.needs_upload(&local_at(100), Some(&remote_at(200)), true));
    }

    #[test]
    fn test_needs_upload_strictly_newer() {
        let policy = TransferPolicy::default();
        assert!(policy.needs_upload(&local_at(201), Some(&remote_at(200)), false));
        // Equal timestamps skip
        assert!(!policy.needs_upload(&local_at(200), Some(&remote_at(200)), false));
        assert!(!policy.needs_upload(&local_at(199), Some(&remote_at(200)), false));
    }

    #[test]
    fn test_needs_upload_without_remote_timestamp() {
        let policy = TransferPolicy::default();
        let remote = RemoteItem {
            key: "a.txt".to_string(),
            size_bytes: 10,
            last_modified: None,
        };
        assert!(policy.needs_upload(&local_at(100), Some(&remote), false));
    }

    #[test]
    fn test_compute_timeout_formula() {
        // 10 MiB at 1 MBps: 10*1024*1024*8 / (1*1024*1024) = 80s, times 5 = 400s
        let t = TransferPolicy::compute_timeout(10 * 1024 * 1024, 1.0);
        assert_eq!(t, Duration::from_secs(400));
    }

    #[test]
    fn test_compute_timeout_floor() {
        assert_eq!(
            TransferPolicy::compute_timeout(0, 10.0),
            Duration::from_secs(1)
        );
        assert_eq!(
            TransferPolicy::compute_timeout(100, 100.0),
            Duration::from_secs(1)
        );
    }

    #[tokio::test]
    async fn test_execute_retries_transient_failures() {
        let policy = TransferPolicy {
            budget: AttemptBudget::Retries { max_attempts: 3 },
        };
        let attempts = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let counter = attempts.clone();

        // RetryConfig::default() backs off from 5s; pause the clock so the
        // test is instant.
        tokio::time::pause();
        let result = policy
            .execute(1, || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) < 1 {
                        Err(Error::Network("connection reset".to_string()))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_deadline_expires() {
        let policy = TransferPolicy::with_deadline(1.0);

        let result: Result<()> = policy
            .execute(1024 * 1024, || async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("deadline"));
    }
}
