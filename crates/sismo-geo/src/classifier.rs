//! The precedence-ordered basin/region decision list.

use std::path::Path;

use sismo_types::{Basin, Event, Point, Region};

use crate::error::GeoError;
use crate::polygon::{point_in_any, point_in_polygon};
use crate::regions::RegionConfig;

/// Assigns basin and region labels to points.
///
/// Stateless with respect to events and immutable once built, so a single
/// instance is shared by every concurrent ingestion path.
#[derive(Debug, Clone, Default)]
pub struct RegionClassifier {
    regions: Option<RegionConfig>,
}

impl RegionClassifier {
    pub fn new(regions: RegionConfig) -> Self {
        Self {
            regions: Some(regions),
        }
    }

    /// A classifier without region data. Every point is unclassified.
    pub fn unloaded() -> Self {
        Self { regions: None }
    }

    /// Loads region data from a JSON document on disk.
    ///
    /// # Errors
    ///
    /// Returns `GeoError` if the document cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeoError> {
        RegionConfig::from_path(path).map(Self::new)
    }

    pub fn is_loaded(&self) -> bool {
        self.regions.is_some()
    }

    pub fn regions(&self) -> Option<&RegionConfig> {
        self.regions.as_ref()
    }

    /// Resolves the basin and region for `point`. First match wins.
    pub fn classify(&self, point: Point) -> (Basin, Region) {
        let Some(r) = &self.regions else {
            return (Basin::Unclassified, Region::Unclassified);
        };

        if point_in_polygon(point, &r.pacific_world) {
            let region = if point_in_polygon(point, &r.pacific_local) {
                Region::Local
            } else if point_in_polygon(point, &r.pacific_regional) {
                Region::Regional
            } else {
                Region::Distant
            };
            return (Basin::Pacific, region);
        }

        if point_in_polygon(point, &r.pacific_local) {
            return (Basin::Pacific, Region::Local);
        }
        if point_in_polygon(point, &r.pacific_regional) {
            return (Basin::Pacific, Region::Regional);
        }
        if point_in_polygon(point, &r.pacific_local_20km) {
            return (Basin::Pacific, Region::Local);
        }

        if point_in_any(point, &r.caribbean_world) {
            return (Basin::Caribbean, Region::Distant);
        }
        if point_in_any(point, &r.caribbean_regional) {
            return (Basin::Caribbean, Region::Regional);
        }
        if point_in_polygon(point, &r.caribbean_local)
            || point_in_polygon(point, &r.caribbean_local_insular)
        {
            return (Basin::Caribbean, Region::Local);
        }

        (Basin::Unclassified, Region::Unclassified)
    }

    /// Classifies the event's epicentre and writes the labels onto it.
    pub fn label(&self, event: &mut Event) {
        let (basin, region) = self.classify(Point::new(event.latitude, event.longitude));
        event.basin = basin;
        event.region = region;
    }
}
