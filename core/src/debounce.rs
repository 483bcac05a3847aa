//! Debounced scheduling for live query input
//!
//! Each call supersedes any previously scheduled work that has not
//! started yet. Work that already began is never interrupted; its
//! results simply arrive alongside the newer call's.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Trailing-edge debouncer keyed by a generation counter.
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `work` after the configured delay, unless a newer call arrives
    /// first. The returned handle completes when the scheduled task does,
    /// whether it ran or was superseded.
    pub fn schedule<F, Fut>(&self, work: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != ticket {
                trace!("debounced work superseded before it started");
                return;
            }
            work().await;
        })
    }
}
