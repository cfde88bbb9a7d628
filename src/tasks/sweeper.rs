//! Expiration Sweeper
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::{duration_to_ms_ceil, CacheStore};

/// Spawns a task that calls `remove_expired` on `store` every `interval`.
///
/// `interval` must be non-zero; `CacheConfig::validate` rejects zero before
/// a `Cache` ever gets here.
///
/// The store lock is taken only for the sweep pass itself, never across the
/// wait between passes. The task exits once `shutdown` flips to `true` or its
/// sender is dropped.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Mutex::new(CacheStore::<String>::new(1000)?));
/// let (tx, rx) = watch::channel(false);
/// let handle = spawn_sweeper(&Handle::current(), store.clone(), Duration::from_secs(1), rx);
/// // Later:
/// tx.send(true).ok();
/// ```
pub fn spawn_sweeper<V>(
    runtime: &Handle,
    store: Arc<Mutex<CacheStore<V>>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Send + 'static,
{
    runtime.spawn(async move {
        info!(interval_ms = duration_to_ms_ceil(interval), "expiration sweeper started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; sweeping starts one interval in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.lock().remove_expired();
                    if removed > 0 {
                        info!(removed, "sweep removed expired entries");
                    } else {
                        debug!("sweep found no expired entries");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("expiration sweeper stopped");
    })
}

// == Sweeper Handle ==
/// Owns a running sweeper task and stops it when dropped.
#[derive(Debug)]
pub struct Sweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Starts sweeping `store` on `runtime`.
    pub fn start<V>(
        runtime: &Handle,
        store: Arc<Mutex<CacheStore<V>>>,
        interval: Duration,
    ) -> Self
    where
        V: Send + 'static,
    {
        let (shutdown, rx) = watch::channel(false);
        let handle = spawn_sweeper(runtime, store, interval, rx);
        Self { shutdown, handle }
    }

    /// Signals the task to stop after its current pass.
    pub fn stop(&self) {
        // The receiver is gone only if the task already exited.
        let _ = self.shutdown.send(true);
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
