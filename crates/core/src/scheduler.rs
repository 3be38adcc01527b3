//! Bounded-parallelism execution of per-item transfer jobs
//!
//! Transfers are I/O bound and independent, so the scheduler drives a fixed
//! number of them concurrently and folds every terminal outcome into one
//! report. Completion order across items is unspecified; callers may only
//! rely on the aggregate counts.

use futures::StreamExt;
use futures::stream;

use crate::item::TransferOutcome;

/// Aggregate of all job outcomes for one scheduler run
///
/// Built by reducing over completions, so no shared mutable counters exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub completed: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl SchedulerReport {
    fn absorb(&mut self, outcome: TransferOutcome) {
        match outcome {
            TransferOutcome::Transferred => self.completed += 1,
            TransferOutcome::Skipped => {
                tracing::debug!("item skipped");
                self.skipped += 1;
            }
            TransferOutcome::Failed(error) => {
                tracing::debug!(%error, "item failed");
                self.failed += 1;
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.completed + self.skipped + self.failed
    }
}

/// Runs a backlog of independent transfer jobs with a fixed worker budget
#[derive(Debug, Clone, Copy)]
pub struct WorkScheduler {
    workers: usize,
}

impl WorkScheduler {
    /// A budget of zero is clamped to one; one worker degenerates to
    /// strictly sequential execution.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Drive every job to a terminal state with at most `workers` in flight
    ///
    /// Individual failures are counted, never propagated; the returned
    /// report accounts for every submitted job.
    pub async fn run<Fut>(&self, jobs: impl IntoIterator<Item = Fut>) -> SchedulerReport
    where
        Fut: Future<Output = TransferOutcome>,
    {
        stream::iter(jobs)
            .buffer_unordered(self.workers)
            .fold(SchedulerReport::default(), |mut report, outcome| async move {
                report.absorb(outcome);
                report
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::Error;

    fn counted(did_work: bool) -> TransferOutcome {
        if did_work {
            TransferOutcome::Transferred
        } else {
            TransferOutcome::Skipped
        }
    }

    #[tokio::test]
    async fn test_all_items_accounted_for() {
        let scheduler = WorkScheduler::new(3);

        // 10 items: 6 transfer, 2 skip, 2 fail
        let jobs = (0..10).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            match i % 5 {
                0 => counted(false),
                1 => TransferOutcome::Failed(Error::Network("reset".to_string())),
                _ => counted(true),
            }
        });

        let report = scheduler.run(jobs).await;
        assert_eq!(report.completed, 6);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.total(), 10);
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_budget() {
        let scheduler = WorkScheduler::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..10).map(|_| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                counted(true)
            }
        });

        let report = scheduler.run(jobs).await;
        assert_eq!(report.completed, 10);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_worker_is_sequential() {
        let scheduler = WorkScheduler::new(1);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..6).map(|i| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                counted(i % 2 == 0)
            }
        });

        let report = scheduler.run(jobs).await;
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        // Same final counts as any other budget
        assert_eq!(report.completed, 3);
        assert_eq!(report.skipped, 3);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_siblings() {
        let scheduler = WorkScheduler::new(4);
        let jobs = (0..8).map(|i| async move {
            if i == 0 {
                TransferOutcome::Failed(Error::Network("503".to_string()))
            } else {
                counted(true)
            }
        });

        let report = scheduler.run(jobs).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.completed, 7);
    }

    #[tokio::test]
    async fn test_empty_backlog() {
        let scheduler = WorkScheduler::new(4);
        let report = scheduler.run(Vec::<std::future::Ready<TransferOutcome>>::new()).await;
        assert_eq!(report, SchedulerReport::default());
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(WorkScheduler::new(0).workers(), 1);
    }
}
