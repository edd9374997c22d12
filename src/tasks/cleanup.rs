//! Expiry Sweeper
//!
//! Optional background task that periodically removes expired entries that
//! no read has touched. Expiry stays correct without it; it only bounds how
//! long dead entries occupy memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedStore;

/// Spawns a task sweeping expired entries every `cleanup_interval_secs`.
///
/// The write lock is held only for the duration of each sweep. Abort the
/// returned handle to stop the task during shutdown.
///
/// # Example
/// ```ignore
/// let store = shared(CacheStore::new());
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 30);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: SharedStore, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweeper with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.write().await.cleanup_expired();

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
