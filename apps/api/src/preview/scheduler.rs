//! Trailing-edge debounce for preview refreshes.
//!
//! Each `schedule` call bumps a generation counter and spawns a task that
//! sleeps for the delay; only the task whose generation is still the latest
//! when it wakes runs its job. A burst of edits therefore produces exactly
//! one terminal refresh.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct PreviewScheduler {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for PreviewScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl PreviewScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Runs `job` after the delay unless another call supersedes it first.
    /// The handle resolves to `true` when the job ran.
    pub fn schedule<F, Fut>(&self, job: F) -> JoinHandle<bool>
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
                debug!(ticket, "Preview refresh superseded");
                return false;
            }
            job().await;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::headless::HeadlessSurface;
    use crate::preview::synchronizer::PreviewSynchronizer;
    use tokio::sync::Mutex;

    fn page(version: usize) -> String {
        format!("<html><head></head><body><p>version {version}</p></body></html>")
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_yields_one_sync() {
        let scheduler = PreviewScheduler::new(Duration::from_millis(300));
        let sync = Arc::new(Mutex::new(PreviewSynchronizer::new(HeadlessSurface::new())));

        let mut handles = Vec::new();
        for version in 1..=5 {
            let sync = Arc::clone(&sync);
            handles.push(scheduler.schedule(move || async move {
                let _ = sync.lock().await.sync(&page(version)).await;
            }));
            tokio::time::advance(Duration::from_millis(100)).await;
        }

        let mut ran = 0;
        for handle in handles {
            if handle.await.unwrap() {
                ran += 1;
            }
        }

        assert_eq!(ran, 1);
        let sync = sync.lock().await;
        assert_eq!(sync.syncs(), 1);
        assert!(sync.surface().html().contains("version 5"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_further_apart_than_delay_each_sync() {
        let scheduler = PreviewScheduler::new(Duration::from_millis(300));
        let sync = Arc::new(Mutex::new(PreviewSynchronizer::new(HeadlessSurface::new())));

        for version in 1..=2 {
            let sync = Arc::clone(&sync);
            let handle = scheduler.schedule(move || async move {
                let _ = sync.lock().await.sync(&page(version)).await;
            });
            assert!(handle.await.unwrap());
        }

        assert_eq!(sync.lock().await.syncs(), 2);
    }
}
