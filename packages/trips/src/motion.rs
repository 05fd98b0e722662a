//! Duration and average-speed sanity bounds.

use trip_events_trip_models::Trip;

use crate::TripFilterConfig;

/// Keeps trips whose duration and average speed fall inside the configured
/// bounds (all bounds inclusive).
#[must_use]
pub fn filter_by_motion(trips: Vec<Trip>, config: &TripFilterConfig) -> Vec<Trip> {
    let total = trips.len();
    let kept: Vec<Trip> = trips
        .into_iter()
        .filter(|trip| has_plausible_motion(trip, config))
        .collect();

    log::info!(
        "Motion filter removed {} of {total} trips",
        total - kept.len()
    );
    kept
}

/// Whether a single trip passes the motion bounds.
#[must_use]
pub fn has_plausible_motion(trip: &Trip, config: &TripFilterConfig) -> bool {
    let duration = trip.duration();
    if duration < config.min_duration() || duration > config.max_duration() {
        return false;
    }

    trip.average_speed_mph()
        .is_some_and(|mph| mph >= config.min_speed_mph && mph <= config.max_speed_mph)
}
