//! Geographic classification of seismic events.
//!
//! Resolves the basin and proximity region of a point by testing it against
//! a fixed, precedence-ordered set of polygons loaded once at startup. The
//! decision list is evaluated first-match-wins; overlapping polygons are
//! resolved by list order, never by area or specificity.
//!
//! | Order | Polygon(s) | Result |
//! |-------|-----------|--------|
//! | 1 | Pacific world belt | Pacific / local, regional or distant (nested) |
//! | 2 | Pacific local | Pacific / local |
//! | 3 | Pacific regional | Pacific / regional |
//! | 4 | Pacific local 20 km | Pacific / local |
//! | 5 | Caribbean world group | Caribbean / distant |
//! | 6 | Caribbean regional group | Caribbean / regional |
//! | 7 | Caribbean local or local insular | Caribbean / local |
//! | 8 | anything else | unclassified / unclassified |
//!
//! # Usage
//!
//! ```rust,ignore
//! use sismo_geo::RegionClassifier;
//! use sismo_types::Point;
//!
//! let classifier = RegionClassifier::load("data/regions.json")?;
//! let (basin, region) = classifier.classify(Point::new(4.6, -77.5));
//! ```

mod classifier;
mod error;
mod polygon;
mod regions;

pub use classifier::RegionClassifier;
pub use error::GeoError;
pub use polygon::{haversine_km, point_in_polygon, point_in_any, EARTH_RADIUS_KM};
pub use regions::RegionConfig;
