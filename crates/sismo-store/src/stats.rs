//! Aggregate counts over the retained events.

use std::collections::BTreeMap;

use serde::Serialize;
use sismo_types::{Basin, Event, FeedSource, Region};

/// Snapshot of the store grouped by label and source.
///
/// Computed fresh from the index on every call; there are no incremental
/// counters to drift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventStats {
    pub total: usize,
    pub by_basin: BTreeMap<Basin, usize>,
    pub by_region: BTreeMap<Region, usize>,
    pub by_source: BTreeMap<FeedSource, usize>,
}

impl EventStats {
    pub(crate) fn collect<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut stats = Self::default();
        for event in events {
            stats.total += 1;
            *stats.by_basin.entry(event.basin).or_default() += 1;
            *stats.by_region.entry(event.region).or_default() += 1;
            *stats.by_source.entry(event.source).or_default() += 1;
        }
        stats
    }
}
