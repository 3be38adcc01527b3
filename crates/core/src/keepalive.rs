//! Keep-host-awake collaborator
//!
//! Long backups are lost if the host suspends halfway through. The actual
//! platform signal is injected by the binary; the core only owns the ticking
//! task, which is aborted when the guard drops.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Interval between host activity signals
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// Receives a periodic "still working" signal
pub trait HostSignaler: Send + Sync + 'static {
    fn signal(&self);
}

/// Guard for the background ticking task; dropping it stops the ticks
#[derive(Debug)]
pub struct KeepAwake {
    handle: JoinHandle<()>,
}

impl KeepAwake {
    pub fn start(interval: Duration, signaler: Arc<dyn HostSignaler>) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so signals are evenly
            // spaced from now.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                signaler.signal();
            }
        });
        Self { handle }
    }
}

impl Drop for KeepAwake {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingSignaler(AtomicUsize);

    impl HostSignaler for CountingSignaler {
        fn signal(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_at_interval() {
        let signaler = Arc::new(CountingSignaler(AtomicUsize::new(0)));
        let _guard = KeepAwake::start(Duration::from_secs(60), signaler.clone());

        tokio::time::sleep(Duration::from_secs(185)).await;
        assert_eq!(signaler.0.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticking() {
        let signaler = Arc::new(CountingSignaler(AtomicUsize::new(0)));
        let guard = KeepAwake::start(Duration::from_secs(60), signaler.clone());

        tokio::time::sleep(Duration::from_secs(65)).await;
        drop(guard);
        let seen = signaler.0.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(signaler.0.load(Ordering::SeqCst), seen);
    }
}
