//! The deduplicating, self-expiring event index.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sismo_geo::RegionClassifier;
use sismo_types::{Basin, Event, Region};
use tokio::sync::mpsc;

use crate::stats::EventStats;

/// Default buffer size of the new-event stream.
pub const DEFAULT_NOTIFY_CAPACITY: usize = 100;

/// Concurrency-safe index of accepted events keyed by upstream identifier.
///
/// Uses `std::sync::RwLock`: every critical section is a handful of map
/// operations that never span an `.await`, so a synchronous lock is both
/// safe and cheaper than an async one. Classification happens before the
/// write lock is taken; the existence check, insert and enqueue happen
/// inside a single write critical section.
pub struct EventManager {
    index: RwLock<HashMap<String, Event>>,
    classifier: Arc<RegionClassifier>,
    max_age: Duration,
    notify_tx: mpsc::Sender<Event>,
}

impl EventManager {
    /// Creates an empty manager and the receiving end of its new-event stream.
    ///
    /// # Panics
    ///
    /// Panics if `notify_capacity` is zero.
    pub fn new(
        classifier: Arc<RegionClassifier>,
        max_age: Duration,
        notify_capacity: usize,
    ) -> (Self, mpsc::Receiver<Event>) {
        let (notify_tx, notify_rx) = mpsc::channel(notify_capacity);
        let manager = Self {
            index: RwLock::new(HashMap::new()),
            classifier,
            max_age,
            notify_tx,
        };
        (manager, notify_rx)
    }

    /// Maximum age an event is retained for by [`evict_expired`](Self::evict_expired).
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Ingests a single raw event.
    ///
    /// Returns `false` without touching any state if the identifier is
    /// already known or the epicentre is unclassifiable. Otherwise labels,
    /// stores and announces the event and returns `true`.
    pub fn ingest_one(&self, event: Event) -> bool {
        self.accept(event).is_some()
    }

    /// Ingests a batch in order and returns the newly accepted events,
    /// labeled, in input order.
    pub fn ingest_many(&self, events: impl IntoIterator<Item = Event>) -> Vec<Event> {
        events
            .into_iter()
            .filter_map(|event| self.accept(event))
            .collect()
    }

    fn accept(&self, mut event: Event) -> Option<Event> {
        if self.read().contains_key(&event.id) {
            return None;
        }

        self.classifier.label(&mut event);
        if !event.is_classified() {
            tracing::trace!(id = %event.id, "dropping unclassified event");
            return None;
        }

        let mut index = self.write();
        let Entry::Vacant(slot) = index.entry(event.id.clone()) else {
            // Lost a race with a concurrent ingest of the same identifier.
            return None;
        };
        slot.insert(event.clone());

        if let Err(e) = self.notify_tx.try_send(event.clone()) {
            tracing::debug!(id = %event.id, "new-event notification dropped: {}", e);
        }

        Some(event)
    }

    /// All retained events, most recent first.
    pub fn query_all(&self) -> Vec<Event> {
        self.collect_sorted(Event::is_classified)
    }

    pub fn query_by_basin(&self, basin: Basin) -> Vec<Event> {
        self.collect_sorted(|e| e.basin == basin)
    }

    pub fn query_by_region(&self, region: Region) -> Vec<Event> {
        self.collect_sorted(|e| e.region == region)
    }

    /// Events strictly between `start` and `end`, most recent first.
    pub fn query_by_time_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Event> {
        self.collect_sorted(|e| e.time > start && e.time < end)
    }

    fn collect_sorted(&self, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .read()
            .values()
            .filter(|e| keep(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.time.cmp(&a.time));
        events
    }

    /// Number of retained events.
    pub fn count(&self) -> usize {
        self.read().values().filter(|e| e.is_classified()).count()
    }

    /// Removes every event that occurred before `now - max_age`.
    ///
    /// Returns the number of events removed.
    pub fn evict_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| now.checked_sub_signed(age))
        else {
            return 0;
        };

        let mut index = self.write();
        let before = index.len();
        index.retain(|_, event| event.time >= cutoff);
        before - index.len()
    }

    /// Evicts with the manager's configured maximum age.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        self.evict_older_than(self.max_age, now)
    }

    /// Counts grouped by basin, region and source.
    pub fn stats(&self) -> EventStats {
        EventStats::collect(self.read().values())
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Event>> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Event>> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }
}
