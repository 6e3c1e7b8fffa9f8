#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sismo_geo::{RegionClassifier, RegionConfig};
use sismo_server::hub::Hub;
use sismo_server::AppState;
use sismo_store::EventManager;
use sismo_types::{Event, FeedSource, Polygon};
use tokio::sync::mpsc;

pub const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

fn rect(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Polygon {
    Polygon::from_coords(&[
        (lat_min, lon_min),
        (lat_min, lon_max),
        (lat_max, lon_max),
        (lat_max, lon_min),
    ])
}

/// Pacific belt with a local box, and one Caribbean box.
///
/// - `(4, -80)` is Pacific / local
/// - `(15, -95)` is Pacific / distant
/// - `(25, -70)` is Caribbean / distant
/// - `(50, 0)` is unclassified
pub fn classifier() -> Arc<RegionClassifier> {
    Arc::new(RegionClassifier::new(RegionConfig {
        pacific_world: rect(0.0, 20.0, -100.0, -80.0),
        pacific_local: rect(2.0, 6.0, -82.0, -78.0),
        caribbean_world: vec![rect(20.0, 30.0, -90.0, -60.0)],
        ..RegionConfig::default()
    }))
}

pub fn event_at(id: &str, lat: f64, lon: f64, time: DateTime<Utc>) -> Event {
    Event::new(id, FeedSource::Usgs, time)
        .with_magnitude(4.5)
        .with_location(format!("test location {id}"))
        .with_coordinates(lat, lon)
        .with_depth(10.0)
}

pub fn pacific_local(id: &str) -> Event {
    event_at(id, 4.0, -80.0, Utc::now())
}

pub fn pacific_distant(id: &str) -> Event {
    event_at(id, 15.0, -95.0, Utc::now())
}

pub fn caribbean_distant(id: &str) -> Event {
    event_at(id, 25.0, -70.0, Utc::now())
}

pub fn unclassified(id: &str) -> Event {
    event_at(id, 50.0, 0.0, Utc::now())
}

pub fn manager() -> (Arc<EventManager>, mpsc::Receiver<Event>) {
    let (manager, rx) = EventManager::new(classifier(), WEEK, 100);
    (Arc::new(manager), rx)
}

/// State with an empty store and a running hub.
pub fn state(queue_capacity: usize) -> (AppState, mpsc::Receiver<Event>) {
    let (manager, rx) = manager();
    let (hub, _task) = Hub::spawn(queue_capacity);
    (AppState { manager, hub }, rx)
}

/// Waits until the hub reports `expected` sessions, or panics after 2 s.
pub async fn wait_for_count(hub: &Hub, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while hub.connected_count() != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {expected} sessions, hub reports {}",
            hub.connected_count()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
