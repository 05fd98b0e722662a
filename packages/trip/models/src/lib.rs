#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Taxi trip record types.
//!
//! A [`Trip`] is one yellow-cab trip as published by the TLC, reduced to
//! the fields the correlation pipeline needs. Duration and average speed
//! are derived on demand rather than stored.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use trip_events_zone_models::ZoneId;

/// Fare components of a trip, in US dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fare {
    /// Time-and-distance fare from the meter.
    pub fare_amount: f64,
    /// Rush hour and overnight surcharges.
    pub extra: f64,
    /// MTA tax.
    pub mta_tax: f64,
    /// Tip (credit card tips only).
    pub tip_amount: f64,
    /// Tolls paid.
    pub tolls_amount: f64,
    /// Improvement surcharge.
    pub improvement_surcharge: f64,
    /// Total charged to the passenger.
    pub total_amount: f64,
}

/// A single taxi trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Row identifier of the trip in the source table.
    pub trip_id: u64,
    /// TLC zone where the meter was engaged.
    pub pickup_zone: ZoneId,
    /// TLC zone where the meter was disengaged.
    pub dropoff_zone: ZoneId,
    /// Local pickup time.
    pub pickup_at: NaiveDateTime,
    /// Local dropoff time.
    pub dropoff_at: NaiveDateTime,
    /// Number of passengers reported by the driver.
    pub passenger_count: u32,
    /// Trip distance in miles reported by the meter.
    pub distance_miles: f64,
    /// Fare breakdown.
    pub fare: Fare,
}

impl Trip {
    /// Elapsed time between pickup and dropoff. Negative when the source
    /// timestamps are out of order.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.dropoff_at - self.pickup_at
    }

    /// Trip duration in hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_hours(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 3_600_000.0
    }

    /// Average speed in miles per hour, or `None` when the duration is not
    /// positive.
    #[must_use]
    pub fn average_speed_mph(&self) -> Option<f64> {
        let hours = self.duration_hours();
        (hours > 0.0).then(|| self.distance_miles / hours)
    }
}
