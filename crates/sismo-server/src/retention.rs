//! Background task enforcing the event store's maximum age.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sismo_store::EventManager;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Starts a background task that periodically evicts aged-out events.
///
/// Runs on its own fixed period, independent of ingestion, until `cancel`
/// fires.
///
/// # Arguments
///
/// * `manager` - The event store to sweep.
/// * `interval` - Time to wait between sweeps.
/// * `cancel` - Stops the task between sweeps.
pub async fn start_eviction_task(
    manager: Arc<EventManager>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_seconds = interval.as_secs(),
        max_age_seconds = manager.max_age().as_secs(),
        "starting event eviction task"
    );

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            () = sleep(interval) => {}
        }

        let removed = manager.evict_expired(Utc::now());
        if removed > 0 {
            tracing::info!(removed, remaining = manager.count(), "evicted expired events");
        } else {
            tracing::debug!("no expired events to evict");
        }
    }

    tracing::info!("event eviction task stopped");
}
