//! Region configuration document.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sismo_types::Polygon;

use crate::error::GeoError;

/// The named polygons and polygon groups consulted by the classifier.
///
/// Loaded once at startup and never mutated. Every field is optional in the
/// source document: a missing polygon or group is empty and never matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Pacific belt enclosing the whole monitored Pacific area.
    #[serde(rename = "latlonCPWorld", default)]
    pub pacific_world: Polygon,
    #[serde(rename = "latlonPacificoLocal", default)]
    pub pacific_local: Polygon,
    #[serde(rename = "latlonPacificoRegional", default)]
    pub pacific_regional: Polygon,
    /// Narrow coastal strip, 20 km offshore.
    #[serde(rename = "latlonPacificoLocal20Km", default)]
    pub pacific_local_20km: Polygon,
    #[serde(rename = "latlonCCWorld", default)]
    pub caribbean_world: Vec<Polygon>,
    #[serde(rename = "latlonCaribeRegional", default)]
    pub caribbean_regional: Vec<Polygon>,
    #[serde(rename = "latlonCaribeLocal", default)]
    pub caribbean_local: Polygon,
    /// Local area around the insular territories.
    #[serde(rename = "latlonCaribeLocalInsular", default)]
    pub caribbean_local_insular: Polygon,
}

impl RegionConfig {
    /// Parses a region document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `GeoError::Parse` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, GeoError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a region document from disk.
    ///
    /// # Errors
    ///
    /// Returns `GeoError::Io` if the file cannot be read, or
    /// `GeoError::Parse` if it is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GeoError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&contents)?;

        tracing::info!(
            path = %path.as_ref().display(),
            pacific_world_points = config.pacific_world.len(),
            pacific_local_points = config.pacific_local.len(),
            caribbean_world_polygons = config.caribbean_world.len(),
            caribbean_regional_polygons = config.caribbean_regional.len(),
            "loaded region data"
        );

        Ok(config)
    }
}
