//! Servicio Geológico Colombiano feed.
//!
//! GeoJSON-shaped, but coordinates are published as `[lat, lon, depth]` and
//! the authoritative time is a UTC wall-clock string.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use sismo_types::{Event, FeedSource};

use crate::{Feed, FeedError};

/// All events of the last five days.
pub const SGC_URL: &str = "http://archive.sgc.gov.co/feed/v1.0/summary/five_days_all.json";

const UTC_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Client for the SGC five-day feed.
pub struct SgcFeed {
    client: reqwest::Client,
    url: String,
}

impl SgcFeed {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, SGC_URL)
    }

    pub fn with_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Feed for SgcFeed {
    fn source(&self) -> FeedSource {
        FeedSource::Sgc
    }

    async fn fetch(&self) -> Result<Vec<Event>, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_sgc(&body, Utc::now())
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
#[serde(rename_all = "camelCase")]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    time: Option<i64>,
    utc_time: Option<String>,
    url: Option<String>,
    closer_towns: Option<String>,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

/// Translates an SGC document into events.
///
/// `now` stamps records that carry no usable time at all.
///
/// # Errors
///
/// Returns `FeedError::Json` if the document itself is malformed. Individual
/// features that cannot be translated are skipped.
pub fn parse_sgc(body: &str, now: DateTime<Utc>) -> Result<Vec<Event>, FeedError> {
    let collection: Collection = serde_json::from_str(body)?;

    let events = collection
        .features
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Feature>(raw) {
            Ok(feature) => translate(feature, now),
            Err(e) => {
                tracing::debug!("skipping malformed SGC feature: {}", e);
                None
            }
        })
        .collect();

    Ok(events)
}

fn translate(feature: Feature, now: DateTime<Utc>) -> Option<Event> {
    let &[lat, lon, depth, ..] = feature.geometry.coordinates.as_slice() else {
        tracing::debug!(id = %feature.id, "skipping SGC feature without 3 coordinates");
        return None;
    };
    let props = feature.properties;
    let time = event_time(props.utc_time.as_deref(), props.time, now);

    Some(
        Event::new(feature.id, FeedSource::Sgc, time)
            .with_magnitude(props.mag.unwrap_or_default())
            .with_location(props.place.unwrap_or_default())
            .with_coordinates(lat, lon)
            .with_depth(depth)
            .with_url(props.url.unwrap_or_default())
            .with_closer_towns(props.closer_towns.unwrap_or_default()),
    )
}

/// `utcTime` wins when present; epoch millis are the fallback, then `now`.
fn event_time(utc_time: Option<&str>, millis: Option<i64>, now: DateTime<Utc>) -> DateTime<Utc> {
    if let Some(text) = utc_time.filter(|t| !t.is_empty()) {
        // An unparseable utcTime does not fall through to millis.
        return UTC_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .map_or(now, |naive| naive.and_utc());
    }

    millis
        .filter(|ms| *ms > 0)
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(now)
}
