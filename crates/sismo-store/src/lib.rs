//! In-memory event index for the sismo service.
//!
//! [`EventManager`] is the single authority deciding whether an event is new
//! and acceptable. It deduplicates by upstream identifier, labels each event
//! through the [`RegionClassifier`](sismo_geo::RegionClassifier), keeps only
//! classified events, evicts them once they age out, and pushes every newly
//! accepted event onto a bounded stream consumed by the notification hub.
//!
//! The store, not the live stream, is authoritative: when the stream is full
//! the event is still retained and only the notification is dropped.

mod manager;
mod stats;

pub use manager::{EventManager, DEFAULT_NOTIFY_CAPACITY};
pub use stats::EventStats;
