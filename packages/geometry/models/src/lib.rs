#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry types shared by every event dataset.
//!
//! Crash locations arrive as single points while street closures are
//! resolved to multi-vertex paths. Both are represented by [`Geometry`] so
//! that zone attribution can match on the two cases exhaustively.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees (WGS 84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    /// Creates a coordinate from a latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A parsed event location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "snake_case")]
pub enum Geometry {
    /// A single location (crash sites).
    Point(LatLon),
    /// An ordered sequence of at least two vertices (street segments).
    Path(Vec<LatLon>),
}

impl Geometry {
    /// Iterates over every vertex of the geometry in order.
    pub fn vertices(&self) -> impl Iterator<Item = &LatLon> {
        match self {
            Self::Point(point) => std::slice::from_ref(point).iter(),
            Self::Path(vertices) => vertices.iter(),
        }
    }

    /// Returns the `(min, max)` corners of the bounding box as
    /// `[lon, lat]` pairs, or `None` for an empty path.
    #[must_use]
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut vertices = self.vertices();
        let first = vertices.next()?;
        let init = ([first.lon, first.lat], [first.lon, first.lat]);

        Some(vertices.fold(init, |(min, max), v| {
            (
                [min[0].min(v.lon), min[1].min(v.lat)],
                [max[0].max(v.lon), max[1].max(v.lat)],
            )
        }))
    }
}
