//! Shared data model for the sismo workspace.
//!
//! This crate defines the event record produced by feed collaborators and
//! labelled by the region classifier, the basin/region/source label enums,
//! and the geometric primitives the classifier consumes. Every other crate
//! depends on it and nothing here depends on the rest of the workspace.

use serde::{Deserialize, Serialize};

mod event;
mod geo;

pub use event::{Event, TIME_FORMAT};
pub use geo::{Point, Polygon};

/// Wire label shared by both label enums for an unclassifiable location.
pub const UNCLASSIFIED_LABEL: &str = "Uncategorized";

/// Top-level geographic bucket assigned to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Basin {
    /// Pacific basin.
    #[serde(rename = "Pacifico")]
    Pacific,
    /// Caribbean basin.
    #[serde(rename = "Caribe")]
    Caribbean,
    /// Outside every configured polygon.
    #[default]
    #[serde(rename = "Uncategorized")]
    Unclassified,
}

impl Basin {
    /// Returns the wire label for this basin.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pacific => "Pacifico",
            Self::Caribbean => "Caribe",
            Self::Unclassified => UNCLASSIFIED_LABEL,
        }
    }
}

impl std::fmt::Display for Basin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Basin {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pacifico" => Ok(Self::Pacific),
            "Caribe" => Ok(Self::Caribbean),
            UNCLASSIFIED_LABEL => Ok(Self::Unclassified),
            _ if s.eq_ignore_ascii_case("pacific") => Ok(Self::Pacific),
            _ if s.eq_ignore_ascii_case("caribbean") => Ok(Self::Caribbean),
            _ => Err(ParseLabelError::Basin(s.to_string())),
        }
    }
}

/// Proximity sub-bucket within a basin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "regional")]
    Regional,
    /// Far field ("lejano" on the wire).
    #[serde(rename = "lejano")]
    Distant,
    #[default]
    #[serde(rename = "Uncategorized")]
    Unclassified,
}

impl Region {
    /// Returns the wire label for this region.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Regional => "regional",
            Self::Distant => "lejano",
            Self::Unclassified => UNCLASSIFIED_LABEL,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Region {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "regional" => Ok(Self::Regional),
            "lejano" => Ok(Self::Distant),
            UNCLASSIFIED_LABEL => Ok(Self::Unclassified),
            _ if s.eq_ignore_ascii_case("distant") => Ok(Self::Distant),
            _ => Err(ParseLabelError::Region(s.to_string())),
        }
    }
}

/// Upstream feed an event was reported by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedSource {
    /// United States Geological Survey.
    Usgs,
    /// GFZ GEOFON programme.
    Geofon,
    /// Servicio Geológico Colombiano.
    Sgc,
}

impl FeedSource {
    /// Returns the wire label for this source.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usgs => "USGS",
            Self::Geofon => "GEOFON",
            Self::Sgc => "SGC",
        }
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeedSource {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USGS" => Ok(Self::Usgs),
            "GEOFON" => Ok(Self::Geofon),
            "SGC" => Ok(Self::Sgc),
            _ => Err(ParseLabelError::Source(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown label string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseLabelError {
    #[error("unknown basin: {0}")]
    Basin(String),
    #[error("unknown region: {0}")]
    Region(String),
    #[error("unknown feed source: {0}")]
    Source(String),
}
