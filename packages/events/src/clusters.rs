//! Same-zone, same-day crash clustering.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, TimeDelta};
use trip_events_event_models::{CrashCluster, CrashPair, TaggedCrash, ZoneDayPairCount};
use trip_events_zone_models::ZoneId;

/// Pairs crashes in the same zone on the same calendar day that happened
/// strictly less than `max_gap` apart.
///
/// The left crash of each pair is taken in input order. A pair is dropped
/// when its reverse was already emitted, so every unordered pair appears
/// once per shared zone. Crashes without a zone never pair.
#[must_use]
pub fn cluster(crashes: &[TaggedCrash], max_gap: TimeDelta) -> Vec<CrashPair> {
    let mut groups: BTreeMap<(ZoneId, NaiveDate), Vec<&TaggedCrash>> = BTreeMap::new();
    for crash in crashes {
        for &zone in &crash.zones {
            groups.entry((zone, crash.date())).or_default().push(crash);
        }
    }

    let mut seen: BTreeSet<(u64, u64)> = BTreeSet::new();
    let mut pairs = Vec::new();

    for left in crashes {
        for &zone in &left.zones {
            let Some(group) = groups.get(&(zone, left.date())) else {
                continue;
            };

            for right in group {
                if right.row_id == left.row_id
                    || (left.occurred_at - right.occurred_at).abs() >= max_gap
                    || seen.contains(&(right.row_id, left.row_id))
                {
                    continue;
                }

                seen.insert((left.row_id, right.row_id));
                pairs.push(CrashPair {
                    first_id: left.row_id,
                    second_id: right.row_id,
                    zone,
                    date: left.date(),
                    first_at: left.occurred_at,
                    second_at: right.occurred_at,
                    first_location: left.location.clone(),
                    second_location: right.location.clone(),
                });
            }
        }
    }

    log::info!(
        "Found {} crash pairs across {} zone-days",
        pairs.len(),
        groups.len()
    );

    pairs
}

/// Pair counts per `(date, zone)`, busiest first.
///
/// Ties are ordered by date, then zone.
#[must_use]
pub fn zone_day_counts(pairs: &[CrashPair]) -> Vec<ZoneDayPairCount> {
    let mut counts: BTreeMap<(NaiveDate, ZoneId), u64> = BTreeMap::new();
    for pair in pairs {
        *counts.entry((pair.date, pair.zone)).or_default() += 1;
    }

    let mut counts: Vec<ZoneDayPairCount> = counts
        .into_iter()
        .map(|((date, zone), pairs)| ZoneDayPairCount { date, zone, pairs })
        .collect();
    counts.sort_by(|a, b| b.pairs.cmp(&a.pairs));
    counts
}

/// The `top_n` anchors with the most pairs, each with all of its pairs.
///
/// Anchors with equal match counts keep the order in which they first
/// appear in `pairs`.
#[must_use]
pub fn largest_clusters(pairs: &[CrashPair], top_n: usize) -> Vec<CrashCluster> {
    let mut order: BTreeMap<u64, usize> = BTreeMap::new();
    let mut anchors: Vec<Vec<&CrashPair>> = Vec::new();
    for pair in pairs {
        let slot = *order.entry(pair.first_id).or_insert_with(|| {
            anchors.push(Vec::new());
            anchors.len() - 1
        });
        anchors[slot].push(pair);
    }

    anchors.sort_by(|a, b| b.len().cmp(&a.len()));
    anchors.truncate(top_n);

    anchors
        .into_iter()
        .filter_map(|anchored| {
            let first = anchored.first()?;
            let matches = anchored.len() as u64;
            Some(CrashCluster {
                anchor_id: first.first_id,
                zone: first.zone,
                date: first.date,
                matches,
                collisions_in_cluster: matches + 1,
                pairs: anchored.into_iter().cloned().collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_events::{at, crash};
    use chrono::Datelike;

    fn ids(pairs: &[CrashPair]) -> Vec<(u64, u64)> {
        pairs.iter().map(|p| (p.first_id, p.second_id)).collect()
    }

    #[test]
    fn close_crashes_pair_once() {
        let crashes = [
            crash(1, Some(5), at(3, 9, 0)),
            crash(2, Some(5), at(3, 9, 30)),
        ];
        let pairs = cluster(&crashes, TimeDelta::hours(1));

        assert_eq!(ids(&pairs), vec![(1, 2)]);
        assert_eq!(pairs[0].zone, ZoneId(5));
        assert_eq!(pairs[0].first_at, at(3, 9, 0));
        assert_eq!(pairs[0].second_at, at(3, 9, 30));
    }

    #[test]
    fn gap_bound_is_exclusive() {
        let crashes = [
            crash(1, Some(5), at(3, 9, 0)),
            crash(2, Some(5), at(3, 10, 0)),
        ];
        assert!(cluster(&crashes, TimeDelta::hours(1)).is_empty());

        let crashes = [
            crash(1, Some(5), at(3, 9, 0)),
            crash(2, Some(5), at(3, 9, 59)),
        ];
        assert_eq!(ids(&cluster(&crashes, TimeDelta::hours(1))), vec![(1, 2)]);
    }

    #[test]
    fn different_zone_or_day_never_pairs() {
        let crashes = [
            crash(1, Some(5), at(3, 23, 50)),
            crash(2, Some(5), at(4, 0, 10)),
            crash(3, Some(6), at(3, 23, 55)),
            crash(4, None, at(3, 23, 52)),
        ];
        assert!(cluster(&crashes, TimeDelta::hours(1)).is_empty());
    }

    #[test]
    fn anchor_follows_input_order() {
        let crashes = [
            crash(2, Some(5), at(3, 9, 30)),
            crash(1, Some(5), at(3, 9, 0)),
            crash(3, Some(5), at(3, 9, 45)),
        ];
        let pairs = cluster(&crashes, TimeDelta::hours(1));
        assert_eq!(ids(&pairs), vec![(2, 1), (2, 3), (1, 3)]);
    }

    #[test]
    fn counts_per_zone_day_busiest_first() {
        let crashes = [
            crash(1, Some(5), at(3, 9, 0)),
            crash(2, Some(5), at(3, 9, 10)),
            crash(3, Some(7), at(3, 9, 0)),
            crash(4, Some(7), at(3, 9, 10)),
            crash(5, Some(7), at(3, 9, 20)),
            crash(6, Some(5), at(1, 9, 0)),
            crash(7, Some(5), at(1, 9, 10)),
        ];
        let counts = zone_day_counts(&cluster(&crashes, TimeDelta::hours(1)));

        let rows: Vec<(u32, u32, u64)> = counts
            .iter()
            .map(|c| (c.date.day(), c.zone.value(), c.pairs))
            .collect();
        assert_eq!(rows, vec![(3, 7, 3), (1, 5, 1), (3, 5, 1)]);
    }

    #[test]
    fn largest_clusters_ranks_anchors() {
        let crashes = [
            crash(1, Some(5), at(3, 9, 0)),
            crash(2, Some(5), at(3, 9, 10)),
            crash(3, Some(5), at(3, 9, 20)),
            crash(4, Some(8), at(3, 12, 0)),
            crash(5, Some(8), at(3, 12, 5)),
        ];
        let pairs = cluster(&crashes, TimeDelta::hours(1));
        let clusters = largest_clusters(&pairs, 35);

        let summary: Vec<(u64, u64, u64)> = clusters
            .iter()
            .map(|c| (c.anchor_id, c.matches, c.collisions_in_cluster))
            .collect();
        assert_eq!(summary, vec![(1, 2, 3), (2, 1, 2), (4, 1, 2)]);
        assert_eq!(clusters[0].pairs.len(), 2);
        assert_eq!(clusters[2].zone, ZoneId(8));

        assert_eq!(largest_clusters(&pairs, 1).len(), 1);
    }
}
