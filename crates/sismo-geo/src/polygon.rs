//! Point-in-polygon and distance primitives.

use sismo_types::{Point, Polygon};

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns `true` if `point` lies inside `polygon`.
///
/// Casts a ray from the point towards increasing longitude and counts edge
/// crossings; an odd count means inside. There is no epsilon handling, so
/// points exactly on an edge get whatever the floating-point arithmetic
/// yields, consistently for a given polygon.
pub fn point_in_polygon(point: Point, polygon: &Polygon) -> bool {
    let vertices = polygon.points();
    if vertices.len() < 3 {
        return false;
    }

    let crossings = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .filter(|(a, b)| ray_crosses_edge(point, **a, **b))
        .count();

    crossings % 2 == 1
}

/// Returns `true` if `point` lies inside any polygon of the group.
pub fn point_in_any(point: Point, polygons: &[Polygon]) -> bool {
    polygons.iter().any(|polygon| point_in_polygon(point, polygon))
}

fn ray_crosses_edge(point: Point, a: Point, b: Point) -> bool {
    // Edge must straddle the ray's latitude; this also excludes horizontal edges.
    if (a.lat > point.lat) == (b.lat > point.lat) {
        return false;
    }

    let slope = (b.lon - a.lon) / (b.lat - a.lat);
    let crossing_lon = a.lon + (point.lat - a.lat) * slope;

    point.lon < crossing_lon
}

/// Great-circle distance between two points in kilometres (haversine).
pub fn haversine_km(a: Point, b: Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
