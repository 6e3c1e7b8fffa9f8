mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use common::{caribbean_distant, pacific_distant, pacific_local, state, unclassified};
use serde_json::Value;
use sismo_server::{app, AppState};
use tower::ServiceExt;

/// Store with one Pacific/local (newest), one Pacific/distant and one
/// Caribbean/distant (oldest) event.
fn seeded() -> AppState {
    let (state, _rx) = state(4);
    let now = Utc::now();
    let mut batch = vec![
        pacific_local("pl"),
        pacific_distant("pd"),
        caribbean_distant("cd"),
        unclassified("xx"),
    ];
    for (offset, event) in batch.iter_mut().enumerate() {
        event.time = now - Duration::minutes(offset as i64);
    }
    assert_eq!(state.manager.ingest_many(batch).len(), 3);
    state
}

async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
    let response = app(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn ids(json: &Value) -> Vec<&str> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_counts() {
    let (status, json) = get(seeded(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["earthquake_count"], 3);
    assert_eq!(json["websocket_clients"], 0);
}

#[tokio::test]
async fn lists_every_event_most_recent_first() {
    let (status, json) = get(seeded(), "/api/earthquakes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["pl", "pd", "cd"]);

    let first = &json[0];
    assert_eq!(first["oceano"], "Pacifico");
    assert_eq!(first["oceanoRegion"], "local");
    assert_eq!(first["source"], "USGS");
}

#[tokio::test]
async fn filters_by_basin() {
    let (_, json) = get(seeded(), "/api/earthquakes?oceano=Pacifico").await;
    assert_eq!(ids(&json), vec!["pl", "pd"]);

    let (_, json) = get(seeded(), "/api/earthquakes?oceano=Caribe").await;
    assert_eq!(ids(&json), vec!["cd"]);
}

#[tokio::test]
async fn filters_by_region() {
    let (_, json) = get(seeded(), "/api/earthquakes?region=lejano").await;
    assert_eq!(ids(&json), vec!["pd", "cd"]);

    let (_, json) = get(seeded(), "/api/earthquakes?region=regional").await;
    assert!(ids(&json).is_empty());
}

#[tokio::test]
async fn basin_filter_takes_precedence_over_region() {
    let (_, json) = get(seeded(), "/api/earthquakes?oceano=Caribe&region=local").await;
    assert_eq!(ids(&json), vec!["cd"]);
}

#[tokio::test]
async fn empty_filter_values_are_ignored() {
    let (status, json) = get(seeded(), "/api/earthquakes?oceano=&region=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json).len(), 3);
}

#[tokio::test]
async fn unknown_label_is_a_bad_request() {
    let (status, json) = get(seeded(), "/api/earthquakes?oceano=Atlantico").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Atlantico"));

    let (status, _) = get(seeded(), "/api/earthquakes?region=nearby").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_groups_by_label_and_source() {
    let (status, json) = get(seeded(), "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    assert_eq!(json["by_basin"]["Pacifico"], 2);
    assert_eq!(json["by_basin"]["Caribe"], 1);
    assert_eq!(json["by_region"]["lejano"], 2);
    assert_eq!(json["by_region"]["local"], 1);
    assert_eq!(json["by_source"]["USGS"], 3);
    assert_eq!(json["websocket_clients"], 0);
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let (state, _rx) = state(4);
    let (status, json) = get(state, "/api/earthquakes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}
