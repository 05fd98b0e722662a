//! Zone adjacency graph.
//!
//! Two zones are adjacent when their polygons are not disjoint, i.e. they
//! share boundary or overlap. The graph is computed once per zone set with
//! an R-tree envelope pre-filter, so only pairs whose bounding boxes meet
//! reach the exact polygon test.

use std::collections::{BTreeMap, BTreeSet};

use geo::Intersects;
use rstar::RTree;
use trip_events_zone_models::ZoneId;

use crate::{Zone, ZoneEntry, compute_envelope};

/// Undirected adjacency between taxi zones.
///
/// Every zone of the source set has an entry, possibly empty. Each
/// unordered pair is tested once and recorded in both directions, so the
/// relation is symmetric by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneAdjacency {
    neighbors: BTreeMap<ZoneId, BTreeSet<ZoneId>>,
}

impl ZoneAdjacency {
    /// Computes the adjacency graph of a zone set.
    #[must_use]
    pub fn build(zones: &[Zone]) -> Self {
        let tree = RTree::bulk_load(ZoneEntry::for_zones(zones));
        let mut graph =
            Self::from_edges(zones.iter().map(|zone| zone.id), std::iter::empty());
        let mut edges = 0_usize;

        for (i, zone) in zones.iter().enumerate() {
            let envelope = compute_envelope(&zone.boundary);

            for candidate in tree.locate_in_envelope_intersecting(&envelope) {
                if candidate.ordinal <= i {
                    continue;
                }
                let other = &zones[candidate.ordinal];
                if other.id == zone.id {
                    continue;
                }
                if zone.boundary.intersects(&other.boundary) {
                    graph.connect(zone.id, other.id);
                    edges += 1;
                }
            }
        }

        let isolated = graph.isolated_zones();
        log::info!(
            "Built zone adjacency: {} zones, {edges} adjacent pairs",
            graph.neighbors.len()
        );
        if !isolated.is_empty() {
            log::warn!("{} zones have no neighbors: {isolated:?}", isolated.len());
        }

        graph
    }

    /// Builds a graph from explicit zones and undirected edges.
    ///
    /// Zones that appear only in `edges` are added as well.
    #[must_use]
    pub fn from_edges(
        zones: impl IntoIterator<Item = ZoneId>,
        edges: impl IntoIterator<Item = (ZoneId, ZoneId)>,
    ) -> Self {
        let mut graph = Self {
            neighbors: zones.into_iter().map(|id| (id, BTreeSet::new())).collect(),
        };
        for (a, b) in edges {
            graph.connect(a, b);
        }
        graph
    }

    fn connect(&mut self, a: ZoneId, b: ZoneId) {
        if a == b {
            self.neighbors.entry(a).or_default();
            return;
        }
        self.neighbors.entry(a).or_default().insert(b);
        self.neighbors.entry(b).or_default().insert(a);
    }

    /// Neighbors of a zone, or `None` if the zone is unknown.
    #[must_use]
    pub fn neighbors(&self, zone: ZoneId) -> Option<&BTreeSet<ZoneId>> {
        self.neighbors.get(&zone)
    }

    /// Whether two zones are adjacent.
    #[must_use]
    pub fn is_adjacent(&self, a: ZoneId, b: ZoneId) -> bool {
        self.neighbors.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Whether a zone is unknown or has no neighbors.
    #[must_use]
    pub fn is_isolated(&self, zone: ZoneId) -> bool {
        self.neighbors.get(&zone).is_none_or(BTreeSet::is_empty)
    }

    /// Zones with no neighbors, in id order.
    #[must_use]
    pub fn isolated_zones(&self) -> Vec<ZoneId> {
        self.neighbors
            .iter()
            .filter(|(_, set)| set.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Zones reachable from `zone` in at most `hops` steps, including
    /// `zone` itself.
    #[must_use]
    pub fn reachable_within(&self, zone: ZoneId, hops: usize) -> BTreeSet<ZoneId> {
        let mut reached = BTreeSet::from([zone]);
        let mut frontier = vec![zone];

        for _ in 0..hops {
            let next: Vec<ZoneId> = frontier
                .iter()
                .filter_map(|id| self.neighbors.get(id))
                .flatten()
                .copied()
                .filter(|id| reached.insert(*id))
                .collect();
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        reached
    }

    /// Verifies that every edge is recorded in both directions.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.neighbors
            .iter()
            .all(|(a, set)| set.iter().all(|b| self.is_adjacent(*b, *a)))
    }

    /// Number of zones in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether the graph has no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Iterates over `(zone, neighbors)` in zone id order.
    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &BTreeSet<ZoneId>)> {
        self.neighbors.iter().map(|(id, set)| (*id, set))
    }
}
