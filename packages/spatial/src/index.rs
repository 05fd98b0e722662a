//! Zone containment lookups.

use geo::{Contains, MultiPolygon};
use rstar::{AABB, RTree};
use trip_events_geometry::{to_geo_line_string, to_geo_point};
use trip_events_geometry_models::Geometry;
use trip_events_zone_models::{ZoneId, borough_matches};

use crate::{Zone, ZoneEntry};

/// Pre-built spatial index over the taxi zones.
///
/// Constructed once and shared across all consumers. Zones keep the order
/// they were supplied in; when a geometry is contained by more than one
/// zone the earliest one wins.
pub struct ZoneIndex {
    zones: Vec<Zone>,
    tree: RTree<ZoneEntry>,
}

impl ZoneIndex {
    /// Builds the R-tree over the supplied zones.
    #[must_use]
    pub fn new(zones: Vec<Zone>) -> Self {
        let tree = RTree::bulk_load(ZoneEntry::for_zones(&zones));
        log::info!("Loaded {} taxi zones into spatial index", tree.size());

        Self { zones, tree }
    }

    /// The zones in stored order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Looks up a zone by id.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    /// Number of zones in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the index holds no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Look up the first zone containing a geometry.
    ///
    /// Points must lie strictly inside the zone; paths must be contained in
    /// their entirety. Returns `None` if no zone contains the geometry.
    #[must_use]
    pub fn zone_for(&self, geometry: &Geometry) -> Option<ZoneId> {
        self.first_containing(geometry).map(|zone| zone.id)
    }

    /// Look up the first zone containing a geometry, requiring its borough
    /// to match a closure borough code.
    ///
    /// Only the first containing zone is considered: if its borough does
    /// not match, the lookup yields `None` rather than falling through to
    /// later zones. The result is then passed through `streak`, which drops
    /// it when it repeats the previously admitted zone.
    #[must_use]
    pub fn zone_for_with_borough(
        &self,
        geometry: &Geometry,
        borough_code: &str,
        streak: &mut ZoneStreak,
    ) -> Option<ZoneId> {
        let zone = self.first_containing(geometry)?;

        if !borough_matches(borough_code, &zone.borough) {
            log::debug!(
                "Zone {} is in {}, not borough code {borough_code}",
                zone.id,
                zone.borough
            );
            return None;
        }

        streak.admit(zone.id)
    }

    fn first_containing(&self, geometry: &Geometry) -> Option<&Zone> {
        let (min, max) = geometry.bounds()?;
        let query_env = AABB::from_corners(min, max);

        let mut candidates: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .map(|entry| entry.ordinal)
            .collect();
        candidates.sort_unstable();

        candidates
            .into_iter()
            .map(|ordinal| &self.zones[ordinal])
            .find(|zone| contains(&zone.boundary, geometry))
    }
}

fn contains(boundary: &MultiPolygon<f64>, geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Point(point) => boundary.contains(&to_geo_point(*point)),
        Geometry::Path(vertices) => boundary.contains(&to_geo_line_string(vertices)),
    }
}

/// Accumulator for streak suppression across a sequence of lookups.
///
/// When enabled, a zone equal to the last admitted zone is dropped. This
/// does not deduplicate: a zone that reappears after a different zone is
/// admitted again, and consecutive records that legitimately share a zone
/// lose every match after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneStreak {
    suppress_repeats: bool,
    previous: Option<ZoneId>,
}

impl ZoneStreak {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new(suppress_repeats: bool) -> Self {
        Self {
            suppress_repeats,
            previous: None,
        }
    }

    /// The last admitted zone, if any.
    #[must_use]
    pub const fn previous(&self) -> Option<ZoneId> {
        self.previous
    }

    /// Admits `zone` unless it repeats the previous one.
    pub fn admit(&mut self, zone: ZoneId) -> Option<ZoneId> {
        if self.suppress_repeats && self.previous == Some(zone) {
            return None;
        }
        self.previous = Some(zone);
        Some(zone)
    }
}

impl Default for ZoneStreak {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_zones::square;
    use trip_events_geometry_models::LatLon;

    fn grid() -> ZoneIndex {
        ZoneIndex::new(vec![
            square(1, "Manhattan", 0.0, 0.0, 1.0),
            square(2, "Brooklyn", 1.0, 0.0, 1.0),
            square(3, "Queens", 0.0, 1.0, 1.0),
        ])
    }

    fn point(lat: f64, lon: f64) -> Geometry {
        Geometry::Point(LatLon::new(lat, lon))
    }

    #[test]
    fn zones_are_kept_in_stored_order() {
        let index = grid();
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
        assert_eq!(index.zones()[1].id, ZoneId(2));
        assert_eq!(index.zone(ZoneId(3)).map(|z| z.borough.as_str()), Some("Queens"));
        assert!(index.zone(ZoneId(4)).is_none());

        let empty = ZoneIndex::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.zone_for(&point(0.5, 0.5)), None);
    }

    #[test]
    fn point_inside_resolves_to_zone() {
        let index = grid();
        assert_eq!(index.zone_for(&point(0.5, 0.5)), Some(ZoneId(1)));
        assert_eq!(index.zone_for(&point(0.5, 1.5)), Some(ZoneId(2)));
        assert_eq!(index.zone_for(&point(1.5, 0.5)), Some(ZoneId(3)));
    }

    #[test]
    fn point_outside_is_unassigned() {
        let index = grid();
        assert_eq!(index.zone_for(&point(5.0, 5.0)), None);
        assert_eq!(index.zone_for(&point(1.5, 1.5)), None);
    }

    #[test]
    fn point_on_shared_edge_is_unassigned() {
        assert_eq!(grid().zone_for(&point(0.5, 1.0)), None);
    }

    #[test]
    fn first_zone_in_stored_order_wins() {
        let index = ZoneIndex::new(vec![
            square(7, "Queens", 0.0, 0.0, 4.0),
            square(3, "Queens", 1.0, 1.0, 1.0),
        ]);
        assert_eq!(index.zone_for(&point(1.5, 1.5)), Some(ZoneId(7)));

        let reversed = ZoneIndex::new(vec![
            square(3, "Queens", 1.0, 1.0, 1.0),
            square(7, "Queens", 0.0, 0.0, 4.0),
        ]);
        assert_eq!(reversed.zone_for(&point(1.5, 1.5)), Some(ZoneId(3)));
    }

    #[test]
    fn path_must_be_fully_contained() {
        let index = grid();
        let inside = Geometry::Path(vec![LatLon::new(0.2, 0.2), LatLon::new(0.8, 0.8)]);
        let crossing = Geometry::Path(vec![LatLon::new(0.5, 0.5), LatLon::new(0.5, 1.5)]);
        assert_eq!(index.zone_for(&inside), Some(ZoneId(1)));
        assert_eq!(index.zone_for(&crossing), None);
    }

    #[test]
    fn borough_mismatch_yields_none() {
        let index = grid();
        let mut streak = ZoneStreak::default();
        assert_eq!(
            index.zone_for_with_borough(&point(0.5, 0.5), "B", &mut streak),
            None
        );
        assert_eq!(
            index.zone_for_with_borough(&point(0.5, 0.5), "M", &mut streak),
            Some(ZoneId(1))
        );
    }

    #[test]
    fn borough_mismatch_does_not_fall_through_to_later_zones() {
        let index = ZoneIndex::new(vec![
            square(1, "Manhattan", 0.0, 0.0, 4.0),
            square(2, "Brooklyn", 1.0, 1.0, 1.0),
        ]);
        let mut streak = ZoneStreak::default();
        assert_eq!(
            index.zone_for_with_borough(&point(1.5, 1.5), "B", &mut streak),
            None
        );
    }

    #[test]
    fn streak_suppresses_immediate_repeats_only() {
        let index = grid();
        let mut streak = ZoneStreak::new(true);
        let a = point(0.5, 0.5);
        let b = point(0.5, 1.5);

        assert_eq!(index.zone_for_with_borough(&a, "M", &mut streak), Some(ZoneId(1)));
        assert_eq!(index.zone_for_with_borough(&a, "M", &mut streak), None);
        assert_eq!(index.zone_for_with_borough(&b, "B", &mut streak), Some(ZoneId(2)));
        assert_eq!(index.zone_for_with_borough(&a, "M", &mut streak), Some(ZoneId(1)));
    }

    #[test]
    fn disabled_streak_admits_repeats() {
        let index = grid();
        let mut streak = ZoneStreak::new(false);
        let a = point(0.5, 0.5);
        assert_eq!(index.zone_for_with_borough(&a, "M", &mut streak), Some(ZoneId(1)));
        assert_eq!(index.zone_for_with_borough(&a, "M", &mut streak), Some(ZoneId(1)));
    }

    #[test]
    fn unmatched_lookup_keeps_previous_zone() {
        let index = grid();
        let mut streak = ZoneStreak::default();
        let a = point(0.5, 0.5);
        assert_eq!(index.zone_for_with_borough(&a, "M", &mut streak), Some(ZoneId(1)));
        assert_eq!(
            index.zone_for_with_borough(&point(9.0, 9.0), "M", &mut streak),
            None
        );
        assert_eq!(streak.previous(), Some(ZoneId(1)));
        assert_eq!(index.zone_for_with_borough(&a, "M", &mut streak), None);
    }
}
