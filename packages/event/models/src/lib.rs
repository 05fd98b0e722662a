#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crash and street closure event types.
//!
//! Raw records ([`CrashRecord`], [`ClosureRecord`], [`StreetGeometryRecord`])
//! come straight from the NYC open data tables. Zone attribution produces
//! the tagged forms ([`TaggedCrash`], [`ClosureZoneLink`]), and the
//! correlation steps produce the output tables ([`TripEventCounts`],
//! [`CrashPair`], [`ZoneDayPairCount`], [`CrashCluster`]).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use trip_events_geometry_models::Geometry;
use trip_events_zone_models::ZoneId;

/// A motor vehicle collision as published by NYPD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashRecord {
    /// Row identifier in the source table.
    pub row_id: u64,
    /// Local crash date and time.
    pub occurred_at: NaiveDateTime,
    /// Location string in `"(lat, lon)"` form.
    pub location: String,
}

/// A crash with its parsed location and zone attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedCrash {
    /// Row identifier in the source table.
    pub row_id: u64,
    /// Local crash date and time.
    pub occurred_at: NaiveDateTime,
    /// Parsed crash location.
    pub location: Geometry,
    /// Zones the crash was attributed to. Empty when unassigned.
    pub zones: Vec<ZoneId>,
}

impl TaggedCrash {
    /// The first attributed zone.
    #[must_use]
    pub fn zone(&self) -> Option<ZoneId> {
        self.zones.first().copied()
    }

    /// Whether the crash was attributed to any zone.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        !self.zones.is_empty()
    }

    /// Calendar date of the crash.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date()
    }
}

/// A street closure permit from NYC DOT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureRecord {
    /// LION street segment id.
    pub segment_id: u64,
    /// Street the closure is on (raw spelling).
    pub street_name: String,
    /// Single-letter borough code (`B`, `S`, `M`, `Q`, `X`).
    pub borough_code: String,
    /// Start of the permitted work window.
    pub work_start: NaiveDateTime,
    /// End of the permitted work window.
    pub work_end: NaiveDateTime,
}

impl ClosureRecord {
    /// Whether `at` falls inside the work window, both ends inclusive.
    #[must_use]
    pub fn is_active_at(&self, at: NaiveDateTime) -> bool {
        self.work_start <= at && at <= self.work_end
    }
}

/// A named street path from the street geometry table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetGeometryRecord {
    /// Street name (raw spelling).
    pub name: String,
    /// Path in `"LINESTRING (lon lat, ...)"` form.
    pub geometry: String,
}

/// Connector row: a closure segment crosses a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureZoneLink {
    /// Closure segment id.
    pub segment_id: u64,
    /// Zone the segment's street path was attributed to.
    pub zone: ZoneId,
}

/// Number of events a trip plausibly encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripEventCounts {
    /// Trip identifier.
    pub trip_id: u64,
    /// Crashes in the pickup or dropoff zone during the trip window.
    pub crash_count: u64,
    /// Distinct closure segments in the pickup or dropoff zone active at
    /// pickup time.
    pub closure_count: u64,
}

/// Two crashes in the same zone on the same day less than the cluster gap
/// apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashPair {
    /// Row id of the crash that anchors the pair.
    pub first_id: u64,
    /// Row id of the paired crash.
    pub second_id: u64,
    /// Shared zone.
    pub zone: ZoneId,
    /// Shared calendar date.
    pub date: NaiveDate,
    /// Time of the first crash.
    pub first_at: NaiveDateTime,
    /// Time of the second crash.
    pub second_at: NaiveDateTime,
    /// Location of the first crash.
    pub first_location: Geometry,
    /// Location of the second crash.
    pub second_location: Geometry,
}

/// Number of crash pairs found in a zone on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDayPairCount {
    /// Calendar date.
    pub date: NaiveDate,
    /// Zone.
    pub zone: ZoneId,
    /// Number of crash pairs.
    pub pairs: u64,
}

/// All pairs anchored on a single crash, ranked by how many other crashes
/// occurred near it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashCluster {
    /// Row id of the anchoring crash.
    pub anchor_id: u64,
    /// Zone of the anchoring crash.
    pub zone: ZoneId,
    /// Date of the anchoring crash.
    pub date: NaiveDate,
    /// Number of pairs anchored on this crash.
    pub matches: u64,
    /// `matches + 1`, counting the anchor itself.
    pub collisions_in_cluster: u64,
    /// The pairs, with both locations, for mapping.
    pub pairs: Vec<CrashPair>,
}
