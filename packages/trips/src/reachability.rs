//! Zone reachability filter.
//!
//! A trip is kept when both zone ids are valid, neither zone is isolated
//! in the adjacency graph, and the dropoff zone lies within the pickup
//! zone's neighborhood under the configured [`HopPolicy`].

use std::collections::{BTreeMap, BTreeSet};

use trip_events_spatial::ZoneAdjacency;
use trip_events_trip_models::Trip;
use trip_events_zone_models::ZoneId;

use crate::{HopPolicy, TripFilterConfig};

/// Precomputed reachable sets for every zone in an adjacency graph.
pub struct ZoneReachability<'a> {
    adjacency: &'a ZoneAdjacency,
    max_zone_id: u32,
    reachable: BTreeMap<ZoneId, BTreeSet<ZoneId>>,
}

impl<'a> ZoneReachability<'a> {
    /// Computes the reachable set of every non-isolated zone.
    #[must_use]
    pub fn new(adjacency: &'a ZoneAdjacency, policy: HopPolicy, max_zone_id: u32) -> Self {
        let reachable = adjacency
            .iter()
            .filter(|(_, neighbors)| !neighbors.is_empty())
            .map(|(zone, _)| (zone, adjacency.reachable_within(zone, policy.hops())))
            .collect();

        Self {
            adjacency,
            max_zone_id,
            reachable,
        }
    }

    /// Why a trip is rejected, or `None` if it is plausible.
    #[must_use]
    pub fn rejection(&self, trip: &Trip) -> Option<ZoneRejection> {
        let (pickup, dropoff) = (trip.pickup_zone, trip.dropoff_zone);

        if !pickup.is_within(self.max_zone_id) || !dropoff.is_within(self.max_zone_id) {
            return Some(ZoneRejection::OutOfRange);
        }
        if self.adjacency.is_isolated(pickup) || self.adjacency.is_isolated(dropoff) {
            return Some(ZoneRejection::IsolatedZone);
        }

        let reachable = self
            .reachable
            .get(&pickup)
            .is_some_and(|zones| zones.contains(&dropoff));
        (!reachable).then_some(ZoneRejection::Unreachable)
    }

    /// Whether a trip passes the zone filter.
    #[must_use]
    pub fn allows(&self, trip: &Trip) -> bool {
        self.rejection(trip).is_none()
    }
}

/// Reason a trip failed the zone filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ZoneRejection {
    /// Pickup or dropoff zone id outside the valid range.
    OutOfRange,
    /// Pickup or dropoff zone has no neighbors.
    IsolatedZone,
    /// Dropoff zone not reachable from the pickup zone.
    Unreachable,
}

/// Keeps trips that pass the zone reachability filter, in input order.
#[must_use]
pub fn filter_by_zones(
    trips: Vec<Trip>,
    adjacency: &ZoneAdjacency,
    config: &TripFilterConfig,
) -> Vec<Trip> {
    let reachability = ZoneReachability::new(adjacency, config.hop_policy, config.max_zone_id);
    let mut rejected: BTreeMap<ZoneRejection, usize> = BTreeMap::new();

    let kept: Vec<Trip> = trips
        .into_iter()
        .filter(|trip| match reachability.rejection(trip) {
            None => true,
            Some(reason) => {
                *rejected.entry(reason).or_default() += 1;
                false
            }
        })
        .collect();

    log::info!(
        "Zone filter ({} policy) kept {} trips, rejected {rejected:?}",
        config.hop_policy,
        kept.len()
    );
    kept
}
