//! Zone attribution for crashes and street closures.

use std::collections::BTreeMap;

use trip_events_event_models::{
    ClosureRecord, ClosureZoneLink, CrashRecord, StreetGeometryRecord, TaggedCrash,
};
use trip_events_geometry::{normalize_street_name, parse_coordinates};
use trip_events_geometry_models::Geometry;
use trip_events_spatial::{ZoneIndex, ZoneStreak};

use crate::EventError;

/// Parses each crash location and attributes it to the first containing
/// zone.
///
/// Crashes outside every zone are kept with an empty zone list.
///
/// # Errors
///
/// * If a crash location string cannot be parsed
pub fn tag_crashes(
    crashes: &[CrashRecord],
    index: &ZoneIndex,
) -> Result<Vec<TaggedCrash>, EventError> {
    let tagged = crashes
        .iter()
        .map(|crash| {
            let location = parse_coordinates(&crash.location).map_err(|source| {
                EventError::CrashLocation {
                    row_id: crash.row_id,
                    source,
                }
            })?;
            let zones = index.zone_for(&location).into_iter().collect();

            Ok(TaggedCrash {
                row_id: crash.row_id,
                occurred_at: crash.occurred_at,
                location,
                zones,
            })
        })
        .collect::<Result<Vec<_>, EventError>>()?;

    let unassigned = tagged.iter().filter(|crash| !crash.is_assigned()).count();
    log::info!(
        "Tagged {} crashes ({unassigned} outside every zone)",
        tagged.len()
    );

    Ok(tagged)
}

/// Street paths keyed by normalized street name.
///
/// Paths under one name keep the order they had in the source table.
#[derive(Debug, Clone, Default)]
pub struct StreetGeometryTable {
    by_name: BTreeMap<String, Vec<Geometry>>,
}

impl StreetGeometryTable {
    /// Parses and groups the street geometry rows.
    ///
    /// # Errors
    ///
    /// * If a geometry string cannot be parsed
    pub fn from_records(records: &[StreetGeometryRecord]) -> Result<Self, EventError> {
        let mut by_name: BTreeMap<String, Vec<Geometry>> = BTreeMap::new();

        for record in records {
            let path =
                parse_coordinates(&record.geometry).map_err(|source| EventError::StreetGeometry {
                    name: record.name.clone(),
                    source,
                })?;
            by_name
                .entry(normalize_street_name(&record.name))
                .or_default()
                .push(path);
        }

        log::info!(
            "Loaded {} street paths under {} names",
            records.len(),
            by_name.len()
        );

        Ok(Self { by_name })
    }

    /// Paths for a street name. The name is normalized before lookup.
    #[must_use]
    pub fn paths(&self, street_name: &str) -> &[Geometry] {
        self.by_name
            .get(&normalize_street_name(street_name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct street names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the table holds no streets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Attributes each closure segment to the zones its street crosses.
///
/// Every path for the closure's street is looked up with the closure's
/// borough code. With `suppress_repeated_zones`, a single streak runs
/// across the whole scan, so a zone equal to the last one admitted (even
/// by a previous closure) is dropped.
#[must_use]
pub fn tag_closures(
    closures: &[ClosureRecord],
    streets: &StreetGeometryTable,
    index: &ZoneIndex,
    suppress_repeated_zones: bool,
) -> Vec<ClosureZoneLink> {
    let (links, _) = closures.iter().fold(
        (Vec::new(), ZoneStreak::new(suppress_repeated_zones)),
        |(mut links, mut streak), closure| {
            let paths = streets.paths(&closure.street_name);
            if paths.is_empty() {
                log::debug!(
                    "No street geometry for closure {} on '{}'",
                    closure.segment_id,
                    closure.street_name
                );
            }

            for path in paths {
                if let Some(zone) =
                    index.zone_for_with_borough(path, &closure.borough_code, &mut streak)
                {
                    links.push(ClosureZoneLink {
                        segment_id: closure.segment_id,
                        zone,
                    });
                }
            }

            (links, streak)
        },
    );

    log::info!(
        "Linked {} closures to zones ({} links)",
        closures.len(),
        links.len()
    );

    links
}
