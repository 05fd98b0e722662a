#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crash and closure attribution, trip correlation, and crash clustering.
//!
//! The pipeline runs in three steps over an already-loaded [`ZoneIndex`]:
//!
//! 1. [`joiner`] attributes each crash and each closure segment to a taxi
//!    zone.
//! 2. [`correlation`] counts, for every trip, the crashes and active
//!    closures in its pickup or dropoff zone around the trip window.
//! 3. [`clusters`] pairs crashes that happened close together in the same
//!    zone on the same day and ranks the busiest anchors.
//!
//! [`ZoneIndex`]: trip_events_spatial::ZoneIndex

pub mod clusters;
pub mod correlation;
pub mod joiner;

pub use clusters::{cluster, largest_clusters, zone_day_counts};
pub use correlation::events_during_trips;
pub use joiner::{StreetGeometryTable, tag_closures, tag_crashes};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trip_events_geometry::GeometryError;

/// Errors that can occur while attributing events to zones.
#[derive(Debug, Error)]
pub enum EventError {
    /// A crash location string could not be parsed.
    #[error("Crash {row_id} has an unusable location: {source}")]
    CrashLocation {
        /// Row id of the offending crash.
        row_id: u64,
        /// Underlying parse failure.
        #[source]
        source: GeometryError,
    },

    /// A street geometry string could not be parsed.
    #[error("Street '{name}' has an unusable geometry: {source}")]
    StreetGeometry {
        /// Raw street name of the offending row.
        name: String,
        /// Underlying parse failure.
        #[source]
        source: GeometryError,
    },
}

/// Tolerance applied around each trip window when counting crashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Minutes added before pickup and after dropoff.
    pub tolerance_minutes: i64,
}

impl CorrelationConfig {
    /// The tolerance as a duration, or `None` if it overflows [`TimeDelta`].
    #[must_use]
    pub fn try_tolerance(&self) -> Option<TimeDelta> {
        TimeDelta::try_minutes(self.tolerance_minutes)
    }

    /// The tolerance as a duration, saturating at the [`TimeDelta`] bounds.
    #[must_use]
    pub fn tolerance(&self) -> TimeDelta {
        saturating(self.tolerance_minutes, self.try_tolerance())
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            tolerance_minutes: 30,
        }
    }
}

/// Crash clustering parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Two crashes pair up when strictly less than this many minutes apart.
    pub max_gap_minutes: i64,
    /// Number of anchors kept by [`largest_clusters`].
    pub top_clusters: usize,
}

impl ClusterConfig {
    /// The gap as a duration, or `None` if it overflows [`TimeDelta`].
    #[must_use]
    pub fn try_max_gap(&self) -> Option<TimeDelta> {
        TimeDelta::try_minutes(self.max_gap_minutes)
    }

    /// The gap as a duration, saturating at the [`TimeDelta`] bounds.
    #[must_use]
    pub fn max_gap(&self) -> TimeDelta {
        saturating(self.max_gap_minutes, self.try_max_gap())
    }
}

fn saturating(value: i64, delta: Option<TimeDelta>) -> TimeDelta {
    delta.unwrap_or(if value < 0 { TimeDelta::MIN } else { TimeDelta::MAX })
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_gap_minutes: 60,
            top_clusters: 35,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_events {
    use chrono::{NaiveDate, NaiveDateTime};
    use geo::{MultiPolygon, polygon};
    use trip_events_event_models::TaggedCrash;
    use trip_events_geometry_models::{Geometry, LatLon};
    use trip_events_spatial::Zone;
    use trip_events_zone_models::ZoneId;

    pub fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 7, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

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

    pub fn crash(row_id: u64, zone: Option<u32>, occurred_at: NaiveDateTime) -> TaggedCrash {
        TaggedCrash {
            row_id,
            occurred_at,
            location: Geometry::Point(LatLon::new(40.7, -74.0)),
            zones: zone.map(ZoneId).into_iter().collect(),
        }
    }
}
