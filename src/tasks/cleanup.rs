//! TTL Sweep Task
//!
//! Background task that periodically reclaims expired store entries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Something that can drop its expired entries.
#[async_trait]
pub trait Sweep: Send + Sync + 'static {
    /// Removes expired entries and returns how many were reclaimed.
    async fn sweep(&self) -> usize;
}

/// Spawns a background task that periodically sweeps `target`.
///
/// The task sleeps for `interval` between runs and exits as soon as
/// `shutdown` is cancelled. It must be called from within a Tokio runtime.
///
/// # Returns
/// A JoinHandle for the spawned task.
///
/// # Example
/// ```ignore
/// let shutdown = CancellationToken::new();
/// let handle = spawn_sweep_task(index.clone(), ttl, shutdown.clone());
/// // Later, during shutdown:
/// shutdown.cancel();
/// ```
pub fn spawn_sweep_task<S: Sweep>(
    target: Arc<S>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = target.sweep().await;

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }

        debug!("TTL sweep task stopped");
    })
}
