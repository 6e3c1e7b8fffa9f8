//! GEOFON RSS feed.
//!
//! Each `<item>` carries the magnitude and place in its title
//! (`M 5.2, NEAR COAST OF CENTRAL CHILE`) and the origin in a whitespace
//! separated description (`2025-11-03 22:30:52  52.26  160.25  10 km  A`).

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use sismo_types::{Event, FeedSource};

use crate::{Feed, FeedError};

/// The 50 most recent events.
pub const GEOFON_URL: &str = "https://geofon.gfz.de/eqinfo/list.php?fmt=rss&nmax=50";

const DESCRIPTION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the GEOFON RSS feed.
pub struct GeofonFeed {
    client: reqwest::Client,
    url: String,
}

impl GeofonFeed {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, GEOFON_URL)
    }

    pub fn with_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Feed for GeofonFeed {
    fn source(&self) -> FeedSource {
        FeedSource::Geofon
    }

    async fn fetch(&self) -> Result<Vec<Event>, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_geofon(&body)
    }
}

#[derive(Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    guid: Text,
}

/// Element text, ignoring attributes such as `isPermaLink`.
#[derive(Default, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Translates a GEOFON RSS document into events.
///
/// # Errors
///
/// Returns `FeedError::Xml` if the document itself is malformed. Items
/// without an id or a readable origin are skipped.
pub fn parse_geofon(body: &str) -> Result<Vec<Event>, FeedError> {
    let rss: Rss = quick_xml::de::from_str(body)?;
    Ok(rss.channel.items.into_iter().filter_map(translate).collect())
}

fn translate(item: Item) -> Option<Event> {
    let id = item.guid.value.trim();
    if id.is_empty() {
        tracing::debug!(title = %item.title, "skipping GEOFON item without guid");
        return None;
    }

    let Some(origin) = Origin::parse(&item.description) else {
        tracing::debug!(id, "skipping GEOFON item with unreadable description");
        return None;
    };
    let (magnitude, location) = parse_title(&item.title);

    Some(
        Event::new(id, FeedSource::Geofon, origin.time)
            .with_magnitude(magnitude)
            .with_location(location)
            .with_coordinates(origin.lat, origin.lon)
            .with_depth(origin.depth)
            .with_url(item.link.trim()),
    )
}

/// Splits `M 5.2, PLACE` into magnitude and place. Titles in any other shape
/// are kept whole as the place, with magnitude 0.
fn parse_title(title: &str) -> (f64, String) {
    let title = title.trim();
    let parsed = title
        .strip_prefix("M ")
        .and_then(|rest| rest.split_once(','))
        .map(|(mag, place)| (mag.trim().parse().unwrap_or_default(), place.trim()));

    match parsed {
        Some((magnitude, place)) => (magnitude, place.to_string()),
        None => (0.0, title.to_string()),
    }
}

struct Origin {
    time: chrono::DateTime<chrono::Utc>,
    lat: f64,
    lon: f64,
    depth: f64,
}

impl Origin {
    fn parse(description: &str) -> Option<Self> {
        let fields: Vec<&str> = description.split_whitespace().collect();
        let &[date, clock, lat, lon, depth, ..] = fields.as_slice() else {
            return None;
        };

        let stamp = format!("{date} {clock}");
        let time = NaiveDateTime::parse_from_str(&stamp, DESCRIPTION_TIME_FORMAT)
            .ok()?
            .and_utc();

        Some(Self {
            time,
            lat: lat.parse().ok()?,
            lon: lon.parse().ok()?,
            depth: depth.parse().unwrap_or_default(),
        })
    }
}
