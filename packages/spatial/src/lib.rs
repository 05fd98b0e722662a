#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index over the taxi zone partition.
//!
//! Zone polygons are loaded once, bulk-loaded into an R-tree of bounding
//! boxes, and shared read-only by every downstream step: crash and closure
//! attribution use [`ZoneIndex`], trip validation uses [`ZoneAdjacency`].

pub mod adjacency;
pub mod index;
pub mod partition;

pub use adjacency::ZoneAdjacency;
pub use index::{ZoneIndex, ZoneStreak};
pub use partition::{ZoneFieldMapping, zones_from_geojson};

use geo::MultiPolygon;
use rstar::{AABB, RTreeObject};
use thiserror::Error;
use trip_events_zone_models::ZoneId;

/// Errors that can occur while loading the zone partition.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The `GeoJSON` document could not be parsed.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// The document parsed but was not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection of taxi zones")]
    NotAFeatureCollection,
}

/// A taxi zone polygon with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    /// TLC zone id.
    pub id: ZoneId,
    /// Human-readable zone name (e.g. "Upper East Side North").
    pub name: String,
    /// Borough name as spelled in the partition (e.g. "Staten Island").
    pub borough: String,
    /// Zone boundary, `x = longitude`, `y = latitude`.
    pub boundary: MultiPolygon<f64>,
}

/// Bounding box of a zone, tagged with the zone's position in stored order.
struct ZoneEntry {
    ordinal: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl ZoneEntry {
    fn for_zones(zones: &[Zone]) -> Vec<Self> {
        zones
            .iter()
            .enumerate()
            .map(|(ordinal, zone)| Self {
                ordinal,
                envelope: compute_envelope(&zone.boundary),
            })
            .collect()
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
pub(crate) mod test_zones {
    use geo::{MultiPolygon, polygon};
    use trip_events_zone_models::ZoneId;

    use crate::Zone;

    /// Axis-aligned square zone with its lower-left corner at `(lon, lat)`.
    pub fn square(id: u32, borough: &str, lon: f64, lat: f64, size: f64) -> Zone {
        let poly = polygon![
            (x: lon, y: lat),
            (x: lon + size, y: lat),
            (x: lon + size, y: lat + size),
            (x: lon, y: lat + size),
            (x: lon, y: lat),
        ];
        Zone {
            id: ZoneId(id),
            name: format!("Zone {id}"),
            borough: borough.to_string(),
            boundary: MultiPolygon(vec![poly]),
        }
    }
}
