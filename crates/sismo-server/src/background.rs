//! Background tasks for the sismo server.
//!
//! Includes:
//! - Polling upstream feeds into the event manager.
//! - Forwarding newly accepted events to the subscriber hub.

use std::sync::Arc;

use futures_util::future::join_all;
use sismo_feeds::Feed;
use sismo_store::EventManager;
use sismo_types::Event;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use crate::hub::Hub;

/// Outcome of one polling cycle across every feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    /// Records returned by feeds that answered.
    pub fetched: usize,
    /// Records newly accepted into the store.
    pub accepted: usize,
    /// Feeds whose fetch failed this cycle.
    pub failed: usize,
}

/// Polls every feed once and ingests what they return.
///
/// Feeds are fetched concurrently and ingested in the order given. A failing
/// feed is logged and skipped; it is retried on the next cycle.
pub async fn collect_once(feeds: &[Arc<dyn Feed>], manager: &EventManager) -> CollectionSummary {
    let results = join_all(feeds.iter().map(|feed| feed.fetch())).await;
    let mut summary = CollectionSummary::default();

    for (feed, result) in feeds.iter().zip(results) {
        let source = feed.source();
        match result {
            Ok(events) => {
                let fetched = events.len();
                let accepted = manager.ingest_many(events).len();
                summary.fetched += fetched;
                summary.accepted += accepted;
                if accepted > 0 {
                    tracing::info!(%source, accepted, fetched, "ingested new events");
                }
            }
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(%source, error = %e, "feed fetch failed; skipping this cycle");
            }
        }
    }

    tracing::info!(
        accepted = summary.accepted,
        failed_feeds = summary.failed,
        stored = manager.count(),
        "collection cycle complete"
    );

    summary
}

/// Starts the feed polling task.
///
/// Polls immediately, then every `interval`, until `cancel` fires.
pub async fn start_collection_task(
    feeds: Vec<Arc<dyn Feed>>,
    manager: Arc<EventManager>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        feeds = feeds.len(),
        interval_seconds = interval.as_secs(),
        "starting feed collection task"
    );

    while !cancel.is_cancelled() {
        // A cycle in progress runs to completion; feed timeouts bound it.
        collect_once(&feeds, &manager).await;

        tokio::select! {
            () = cancel.cancelled() => break,
            () = sleep(interval) => {}
        }
    }

    tracing::info!("feed collection task stopped");
}

/// Starts the task forwarding the manager's new-event stream to the hub.
///
/// Runs until the stream closes or `cancel` fires. Events are broadcast in
/// the order the manager accepted them.
pub async fn start_notification_task(
    mut new_events: mpsc::Receiver<Event>,
    hub: Hub,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            next = new_events.recv() => match next {
                Some(event) => event,
                None => break,
            },
        };

        tracing::info!(
            id = %event.id,
            magnitude = event.magnitude,
            location = %event.location,
            basin = %event.basin,
            region = %event.region,
            "new earthquake detected"
        );
        hub.broadcast(&event);
    }

    tracing::info!("notification task stopped");
}
