//! USGS GeoJSON summary feed.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use sismo_types::{Event, FeedSource};

use crate::{Feed, FeedError};

/// Events of magnitude 4.5+ over the past week.
pub const USGS_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_week.geojson";

/// Client for the USGS summary feed.
pub struct UsgsFeed {
    client: reqwest::Client,
    url: String,
}

impl UsgsFeed {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, USGS_URL)
    }

    pub fn with_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Feed for UsgsFeed {
    fn source(&self) -> FeedSource {
        FeedSource::Usgs
    }

    async fn fetch(&self) -> Result<Vec<Event>, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_usgs(&body)
    }
}

#[derive(Deserialize)]
struct Collection {
    #[serde(default)]
    features: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Feature {
    id: String,
    properties: Properties,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    /// Milliseconds since the Unix epoch.
    time: i64,
    url: Option<String>,
}

#[derive(Deserialize)]
struct Geometry {
    /// `[lon, lat, depth]`.
    coordinates: Vec<f64>,
}

/// Translates a USGS GeoJSON document into events.
///
/// # Errors
///
/// Returns `FeedError::Json` if the document itself is malformed. Individual
/// features that cannot be translated are skipped.
pub fn parse_usgs(body: &str) -> Result<Vec<Event>, FeedError> {
    let collection: Collection = serde_json::from_str(body)?;

    let events = collection
        .features
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Feature>(raw) {
            Ok(feature) => translate(feature),
            Err(e) => {
                tracing::debug!("skipping malformed USGS feature: {}", e);
                None
            }
        })
        .collect();

    Ok(events)
}

fn translate(feature: Feature) -> Option<Event> {
    let &[lon, lat, depth, ..] = feature.geometry.coordinates.as_slice() else {
        tracing::debug!(id = %feature.id, "skipping USGS feature without 3 coordinates");
        return None;
    };
    let time = DateTime::from_timestamp_millis(feature.properties.time)?;

    Some(
        Event::new(feature.id, FeedSource::Usgs, time)
            .with_magnitude(feature.properties.mag.unwrap_or_default())
            .with_location(feature.properties.place.unwrap_or_default())
            .with_coordinates(lat, lon)
            .with_depth(depth)
            .with_url(feature.properties.url.unwrap_or_default()),
    )
}
