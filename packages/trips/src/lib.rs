#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Taxi trip plausibility filtering.
//!
//! Raw TLC trip data contains meter glitches (zero-length trips, 300 mph
//! averages) and zone pairs no real trip could connect. Two filters remove
//! them before correlation:
//!
//! - [`motion::filter_by_motion`] bounds duration and average speed.
//! - [`reachability::filter_by_zones`] keeps trips whose dropoff zone is
//!   reachable from the pickup zone over the zone adjacency graph.

pub mod motion;
pub mod reachability;

pub use motion::filter_by_motion;
pub use reachability::{ZoneReachability, ZoneRejection, filter_by_zones};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use trip_events_spatial::ZoneAdjacency;
use trip_events_trip_models::Trip;
use trip_events_zone_models::MAX_TAXI_ZONE_ID;

/// How far over the adjacency graph a dropoff zone may be from the pickup
/// zone.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HopPolicy {
    /// Same zone or a direct neighbor.
    #[default]
    Direct,
    /// Same zone, a neighbor, or a neighbor of a neighbor.
    TwoHop,
}

impl HopPolicy {
    /// Maximum number of adjacency hops allowed.
    #[must_use]
    pub const fn hops(self) -> usize {
        match self {
            Self::Direct => 1,
            Self::TwoHop => 2,
        }
    }
}

/// Thresholds for both trip filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripFilterConfig {
    /// Shortest plausible trip, inclusive.
    pub min_duration_seconds: i64,
    /// Longest plausible trip, inclusive.
    pub max_duration_hours: i64,
    /// Slowest plausible average speed, inclusive.
    pub min_speed_mph: f64,
    /// Fastest plausible average speed, inclusive.
    pub max_speed_mph: f64,
    /// Highest valid zone id; ids outside `1..=max_zone_id` are rejected.
    pub max_zone_id: u32,
    /// Reachability policy for the zone filter.
    pub hop_policy: HopPolicy,
}

impl Default for TripFilterConfig {
    fn default() -> Self {
        Self {
            min_duration_seconds: 60,
            max_duration_hours: 24,
            min_speed_mph: 1.0,
            max_speed_mph: 90.0,
            max_zone_id: MAX_TAXI_ZONE_ID,
            hop_policy: HopPolicy::Direct,
        }
    }
}

impl TripFilterConfig {
    /// Shortest plausible duration, or `None` if it overflows [`TimeDelta`].
    #[must_use]
    pub fn try_min_duration(&self) -> Option<TimeDelta> {
        TimeDelta::try_seconds(self.min_duration_seconds)
    }

    /// Longest plausible duration, or `None` if it overflows [`TimeDelta`].
    #[must_use]
    pub fn try_max_duration(&self) -> Option<TimeDelta> {
        TimeDelta::try_hours(self.max_duration_hours)
    }

    /// Shortest plausible duration, saturating at the [`TimeDelta`] bounds.
    #[must_use]
    pub fn min_duration(&self) -> TimeDelta {
        saturating(self.min_duration_seconds, self.try_min_duration())
    }

    /// Longest plausible duration, saturating at the [`TimeDelta`] bounds.
    #[must_use]
    pub fn max_duration(&self) -> TimeDelta {
        saturating(self.max_duration_hours, self.try_max_duration())
    }
}

fn saturating(value: i64, delta: Option<TimeDelta>) -> TimeDelta {
    delta.unwrap_or(if value < 0 { TimeDelta::MIN } else { TimeDelta::MAX })
}

/// Runs the motion filter followed by the zone filter.
#[must_use]
pub fn filter_trips(
    trips: Vec<Trip>,
    adjacency: &ZoneAdjacency,
    config: &TripFilterConfig,
) -> Vec<Trip> {
    let total = trips.len();
    let moving = filter_by_motion(trips, config);
    let kept = filter_by_zones(moving, adjacency, config);

    log::info!("Kept {} of {total} trips after plausibility filtering", kept.len());
    kept
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_trips::trip;
    use trip_events_zone_models::ZoneId;

    #[test]
    fn hop_policy_parses_from_snake_case() {
        assert_eq!("two_hop".parse::<HopPolicy>().unwrap(), HopPolicy::TwoHop);
        assert_eq!(HopPolicy::Direct.to_string(), "direct");
    }

    #[test]
    fn filter_trips_applies_both_stages() {
        let adjacency = ZoneAdjacency::from_edges(
            [ZoneId(1), ZoneId(2), ZoneId(3)],
            [(ZoneId(1), ZoneId(2)), (ZoneId(2), ZoneId(3))],
        );
        let trips = vec![
            trip(1, 1, 2, 20, 4.0),
            // 0.5 mph
            trip(2, 1, 2, 60, 0.5),
            // not adjacent
            trip(3, 1, 3, 20, 4.0),
        ];
        let kept = filter_trips(trips, &adjacency, &TripFilterConfig::default());
        let ids: Vec<u64> = kept.iter().map(|t| t.trip_id).collect();
        assert_eq!(ids, vec![1]);
    }
}
