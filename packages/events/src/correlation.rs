//! Temporal correlation of trips with crashes and closures.
//!
//! A crash counts toward a trip when it was attributed to the trip's
//! pickup or dropoff zone and happened within
//! `[pickup - tolerance, dropoff + tolerance]`. A closure counts when one
//! of its segments lies in either zone and its work window contains the
//! pickup time. Both windows are inclusive on both ends.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDateTime, TimeDelta};
use trip_events_event_models::{ClosureRecord, ClosureZoneLink, TaggedCrash, TripEventCounts};
use trip_events_trip_models::Trip;
use trip_events_zone_models::ZoneId;

/// Crash times per zone, sorted ascending.
struct CrashTimeline {
    by_zone: BTreeMap<ZoneId, Vec<(NaiveDateTime, usize)>>,
}

impl CrashTimeline {
    fn new(crashes: &[TaggedCrash]) -> Self {
        let mut by_zone: BTreeMap<ZoneId, Vec<(NaiveDateTime, usize)>> = BTreeMap::new();
        for (i, crash) in crashes.iter().enumerate() {
            for &zone in &crash.zones {
                by_zone.entry(zone).or_default().push((crash.occurred_at, i));
            }
        }
        for entries in by_zone.values_mut() {
            entries.sort_unstable();
        }
        Self { by_zone }
    }

    /// Crashes in `zone` at or after `from` and at or before `to`.
    fn between(
        &self,
        zone: ZoneId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> impl Iterator<Item = usize> + '_ {
        let entries = self
            .by_zone
            .get(&zone)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let start = entries.partition_point(|(at, _)| *at < from);
        let end = entries.partition_point(|(at, _)| *at <= to);
        entries[start..end.max(start)].iter().map(|(_, i)| *i)
    }
}

/// Closure segments per zone and work windows per segment.
struct ClosureSchedule {
    segments_by_zone: BTreeMap<ZoneId, BTreeSet<u64>>,
    windows: BTreeMap<u64, Vec<(NaiveDateTime, NaiveDateTime)>>,
}

impl ClosureSchedule {
    fn new(closures: &[ClosureRecord], links: &[ClosureZoneLink]) -> Self {
        let mut windows: BTreeMap<u64, Vec<(NaiveDateTime, NaiveDateTime)>> = BTreeMap::new();
        for closure in closures {
            windows
                .entry(closure.segment_id)
                .or_default()
                .push((closure.work_start, closure.work_end));
        }

        let mut segments_by_zone: BTreeMap<ZoneId, BTreeSet<u64>> = BTreeMap::new();
        for link in links {
            segments_by_zone
                .entry(link.zone)
                .or_default()
                .insert(link.segment_id);
        }

        Self {
            segments_by_zone,
            windows,
        }
    }

    fn is_active(&self, segment_id: u64, at: NaiveDateTime) -> bool {
        self.windows.get(&segment_id).is_some_and(|windows| {
            windows
                .iter()
                .any(|(start, end)| *start <= at && at <= *end)
        })
    }

    /// Segments linked to `zone`.
    fn segments(&self, zone: ZoneId) -> impl Iterator<Item = u64> + '_ {
        self.segments_by_zone
            .get(&zone)
            .into_iter()
            .flat_map(|segments| segments.iter().copied())
    }
}

/// Counts the crashes and active closures each trip plausibly encountered.
///
/// One row is produced per trip, in input order, including trips with no
/// events. A crash or segment linked to both the pickup and dropoff zone
/// is counted once.
#[must_use]
pub fn events_during_trips(
    trips: &[Trip],
    crashes: &[TaggedCrash],
    closures: &[ClosureRecord],
    links: &[ClosureZoneLink],
    tolerance: TimeDelta,
) -> Vec<TripEventCounts> {
    let timeline = CrashTimeline::new(crashes);
    let schedule = ClosureSchedule::new(closures, links);

    let counts: Vec<TripEventCounts> = trips
        .iter()
        .map(|trip| {
            let zones = BTreeSet::from([trip.pickup_zone, trip.dropoff_zone]);
            let from = trip
                .pickup_at
                .checked_sub_signed(tolerance)
                .unwrap_or(NaiveDateTime::MIN);
            let to = trip
                .dropoff_at
                .checked_add_signed(tolerance)
                .unwrap_or(NaiveDateTime::MAX);

            let crash_ids: BTreeSet<usize> = zones
                .iter()
                .flat_map(|&zone| timeline.between(zone, from, to))
                .collect();
            let segment_ids: BTreeSet<u64> = zones
                .iter()
                .flat_map(|&zone| schedule.segments(zone))
                .filter(|&segment| schedule.is_active(segment, trip.pickup_at))
                .collect();

            TripEventCounts {
                trip_id: trip.trip_id,
                crash_count: crash_ids.len() as u64,
                closure_count: segment_ids.len() as u64,
            }
        })
        .collect();

    let with_crashes = counts.iter().filter(|c| c.crash_count > 0).count();
    let with_closures = counts.iter().filter(|c| c.closure_count > 0).count();
    log::info!(
        "Correlated {} trips: {with_crashes} near crashes, {with_closures} near active closures",
        counts.len()
    );

    counts
}
