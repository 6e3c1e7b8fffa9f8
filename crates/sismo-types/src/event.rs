//! The event record exchanged between feeds, the store and subscribers.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::{Basin, FeedSource, Region};

/// Wire format of [`Event::time`]: UTC without a timezone suffix.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One observed seismic event.
///
/// Records are built unlabeled by a feed, receive their [`Basin`] and
/// [`Region`] exactly once at ingestion, and are otherwise immutable. The
/// `id` is provided by the upstream source and is the sole deduplication key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    pub magnitude: f64,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Depth in kilometres.
    pub depth: f64,
    #[serde(serialize_with = "serialize_time")]
    pub time: DateTime<Utc>,
    pub source: FeedSource,
    #[serde(rename = "oceano")]
    pub basin: Basin,
    #[serde(rename = "oceanoRegion")]
    pub region: Region,
    #[serde(skip_serializing_if = "is_blank")]
    pub url: Option<String>,
    /// Nearby localities, as reported by sources that publish them.
    #[serde(rename = "closerTowns", skip_serializing_if = "is_blank")]
    pub closer_towns: Option<String>,
}

impl Event {
    /// Creates an unlabeled event with zeroed measurements.
    pub fn new(id: impl Into<String>, source: FeedSource, time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            magnitude: 0.0,
            location: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            depth: 0.0,
            time,
            source,
            basin: Basin::Unclassified,
            region: Region::Unclassified,
            url: None,
            closer_towns: None,
        }
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the epicentre in degrees.
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the reference URL. Empty strings are treated as absent.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.url = (!url.trim().is_empty()).then_some(url);
        self
    }

    /// Sets the nearby-localities text. Empty strings are treated as absent.
    pub fn with_closer_towns(mut self, towns: impl Into<String>) -> Self {
        let towns = towns.into();
        self.closer_towns = (!towns.trim().is_empty()).then_some(towns);
        self
    }

    /// Returns `true` when both labels carry a real classification.
    ///
    /// Only classified events are ever retained by the store.
    pub fn is_classified(&self) -> bool {
        self.basin != Basin::Unclassified && self.region != Region::Unclassified
    }
}

fn serialize_time<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(TIME_FORMAT))
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Event {
        let time = Utc.with_ymd_and_hms(2025, 11, 3, 22, 30, 52).unwrap();
        Event::new("us7000abcd", FeedSource::Usgs, time)
            .with_magnitude(5.2)
            .with_location("near coast of central Chile")
            .with_coordinates(-33.1, -72.4)
            .with_depth(10.0)
    }

    #[test]
    fn new_event_is_unclassified() {
        let event = sample();
        assert_eq!(event.basin, Basin::Unclassified);
        assert_eq!(event.region, Region::Unclassified);
        assert!(!event.is_classified());
    }

    #[test]
    fn partially_labeled_event_is_not_classified() {
        let mut event = sample();
        event.basin = Basin::Pacific;
        assert!(!event.is_classified());
        event.region = Region::Local;
        assert!(event.is_classified());
    }

    #[test]
    fn serializes_to_wire_shape() {
        let mut event = sample().with_url("https://earthquake.usgs.gov/x");
        event.basin = Basin::Pacific;
        event.region = Region::Distant;

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], "us7000abcd");
        assert_eq!(json["time"], "2025-11-03 22:30:52");
        assert_eq!(json["source"], "USGS");
        assert_eq!(json["oceano"], "Pacifico");
        assert_eq!(json["oceanoRegion"], "lejano");
        assert_eq!(json["url"], "https://earthquake.usgs.gov/x");
        assert_eq!(json["magnitude"], 5.2);
        assert!(json.get("closerTowns").is_none());
    }

    #[test]
    fn empty_url_is_omitted() {
        let event = sample().with_url("");
        assert_eq!(event.url, None);

        let mut raw = sample();
        raw.url = Some(String::new());
        let json = serde_json::to_value(&raw).unwrap();
        assert!(json.get("url").is_none());
    }
}
