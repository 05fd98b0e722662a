#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end trip and event correlation.
//!
//! [`run_analysis`] wires every stage together: zone loading, adjacency,
//! trip filtering, crash and closure attribution, trip correlation, and
//! crash clustering. All inputs are in memory; loading them from disk or
//! a database is left to the caller.

pub mod config;

pub use config::{AnalysisConfig, ZoneConfig};

use serde::Serialize;
use thiserror::Error;
use trip_events_event_models::{
    ClosureRecord, ClosureZoneLink, CrashCluster, CrashPair, CrashRecord, StreetGeometryRecord,
    TaggedCrash, TripEventCounts, ZoneDayPairCount,
};
use trip_events_events::{
    EventError, StreetGeometryTable, cluster, events_during_trips, largest_clusters,
    tag_closures, tag_crashes, zone_day_counts,
};
use trip_events_spatial::{SpatialError, Zone, ZoneAdjacency, ZoneIndex, zones_from_geojson};
use trip_events_trip_models::Trip;
use trip_events_trips::filter_trips;
use trip_events_zone_models::ZoneId;

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The zone partition could not be loaded.
    #[error("Zone loading error: {0}")]
    Spatial(#[from] SpatialError),

    /// A crash or street record could not be attributed.
    #[error("Event attribution error: {0}")]
    Event(#[from] EventError),

    /// The configuration document could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration value parsed but is outside its usable range.
    #[error("Invalid configuration value for '{key}': {value}")]
    InvalidConfig {
        /// Dotted key of the offending value.
        key: &'static str,
        /// The rejected value.
        value: i64,
    },
}

/// Where the zone partition comes from.
#[derive(Debug, Clone)]
pub enum ZoneSource {
    /// Already-built zones, in stored order.
    Zones(Vec<Zone>),
    /// A `GeoJSON` `FeatureCollection`, parsed with the configured field
    /// mapping.
    Geojson(String),
}

/// Raw pipeline inputs.
#[derive(Debug, Clone)]
pub struct AnalysisInputs {
    /// Taxi zone partition.
    pub zones: ZoneSource,
    /// Raw trips, before plausibility filtering.
    pub trips: Vec<Trip>,
    /// Raw crash records.
    pub crashes: Vec<CrashRecord>,
    /// Street closure permits.
    pub closures: Vec<ClosureRecord>,
    /// Street geometry table used to place closures.
    pub streets: Vec<StreetGeometryRecord>,
}

/// Every output table of the pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Zones with no neighbors; trips touching them were dropped.
    pub isolated_zones: Vec<ZoneId>,
    /// Trips that passed the plausibility filters.
    pub trips: Vec<Trip>,
    /// Every crash with its zone, in input order.
    pub tagged_crashes: Vec<TaggedCrash>,
    /// Closure segment to zone links.
    pub closure_links: Vec<ClosureZoneLink>,
    /// One row per retained trip.
    pub trip_events: Vec<TripEventCounts>,
    /// Same-zone, same-day crash pairs.
    pub crash_pairs: Vec<CrashPair>,
    /// Pair counts per date and zone, busiest first.
    pub zone_day_counts: Vec<ZoneDayPairCount>,
    /// Highest-ranked crash anchors.
    pub largest_clusters: Vec<CrashCluster>,
}

/// Runs the full pipeline.
///
/// # Errors
///
/// * If a configuration value is out of range
/// * If the zone `GeoJSON` cannot be parsed
/// * If a crash location or street geometry string cannot be parsed
pub fn run_analysis(
    inputs: AnalysisInputs,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;

    let zones = match inputs.zones {
        ZoneSource::Zones(zones) => zones,
        ZoneSource::Geojson(doc) => zones_from_geojson(&doc, &config.zones.fields)?,
    };

    let index = ZoneIndex::new(zones);
    let adjacency = ZoneAdjacency::build(index.zones());

    let trips = filter_trips(inputs.trips, &adjacency, &config.trips);

    let tagged_crashes = tag_crashes(&inputs.crashes, &index)?;
    let streets = StreetGeometryTable::from_records(&inputs.streets)?;
    let closure_links = tag_closures(
        &inputs.closures,
        &streets,
        &index,
        config.zones.suppress_repeated_zones,
    );

    let trip_events = events_during_trips(
        &trips,
        &tagged_crashes,
        &inputs.closures,
        &closure_links,
        config.correlation.tolerance(),
    );

    let crash_pairs = cluster(&tagged_crashes, config.clusters.max_gap());
    let zone_day_counts = zone_day_counts(&crash_pairs);
    let largest_clusters = largest_clusters(&crash_pairs, config.clusters.top_clusters);

    log::info!(
        "Analysis complete: {} zones, {} trips, {} crashes, {} closure links, {} crash pairs",
        index.len(),
        trips.len(),
        tagged_crashes.len(),
        closure_links.len(),
        crash_pairs.len()
    );

    Ok(AnalysisReport {
        isolated_zones: adjacency.isolated_zones(),
        trips,
        tagged_crashes,
        closure_links,
        trip_events,
        crash_pairs,
        zone_day_counts,
        largest_clusters,
    })
}
