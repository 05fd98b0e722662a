//! Conversions into `geo` types for containment tests.
//!
//! `geo` uses `x = longitude`, `y = latitude`.

use geo::{Coord, LineString, Point};
use trip_events_geometry_models::LatLon;

/// Converts a coordinate into a [`Point`].
#[must_use]
pub fn to_geo_point(coord: LatLon) -> Point<f64> {
    Point::new(coord.lon, coord.lat)
}

/// Converts an ordered vertex list into a [`LineString`].
#[must_use]
pub fn to_geo_line_string(vertices: &[LatLon]) -> LineString<f64> {
    vertices
        .iter()
        .map(|v| Coord { x: v.lon, y: v.lat })
        .collect()
}
