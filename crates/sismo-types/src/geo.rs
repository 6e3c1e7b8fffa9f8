//! Geometric primitives used as classifier input.

use serde::{Deserialize, Deserializer, Serialize};

/// A (latitude, longitude) pair in degrees.
///
/// Region documents encode points as `[lat, lon]` arrays; anything that
/// re-serializes a point emits `{ "lat": .., "lon": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let coords = Vec::<f64>::deserialize(deserializer)?;
        match coords.as_slice() {
            [lat, lon, ..] => Ok(Self::new(*lat, *lon)),
            _ => Err(serde::de::Error::invalid_length(
                coords.len(),
                &"a [lat, lon] pair",
            )),
        }
    }
}

/// An implicitly closed ring of points: the last point connects back to
/// the first. Fewer than three points never contain anything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<Point>);

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Builds a polygon from `(lat, lon)` tuples.
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self(coords.iter().map(|&(lat, lon)| Point::new(lat, lon)).collect())
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
