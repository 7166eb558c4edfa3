use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::store::ResetRequestStore;

/// Periodically purge expired reset requests until shutdown is signaled.
///
/// Storage failures are logged and the loop keeps going; the next tick
/// retries.
pub async fn run(
    store: Arc<ResetRequestStore>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!("Reset request cleanup started (every {}s)", interval.as_secs());

    loop {
        if *shutdown.borrow() {
            break;
        }

        match store.remove_expired().await {
            Ok(0) => {}
            Ok(removed) => tracing::info!("Purged {removed} expired reset requests"),
            Err(e) => tracing::error!("Reset request cleanup failed: {e}"),
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                // Sender dropped; treat as shutdown.
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tracing::info!("Reset request cleanup stopped");
}

/// Spawn [`run`] on the current runtime.
pub fn spawn(
    store: Arc<ResetRequestStore>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(store, interval, shutdown))
}
