//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from the
//! memory store. Redis expires keys on its own and needs no sweeper.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// Expired entries are already invisible to reads; the sweep only reclaims
/// memory held by keys nobody touches again.
///
/// # Arguments
/// * `store` - Memory store to sweep (clones share the keyspace)
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(store: MemoryStore, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;

            if removed > 0 {
                info!(
                    "TTL cleanup: removed {} expired entries, {} remain",
                    removed,
                    store.len().await
                );
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
