#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate parsing for the event datasets.
//!
//! Crash records carry `"(lat, lon)"` strings while the street geometry
//! table stores WKT-style `"LINESTRING (lon lat, ...)"` strings. The two
//! encodings use opposite axis orders; [`parse_coordinates`] normalizes
//! both into a [`Geometry`] with explicit latitude/longitude fields.

pub mod convert;
pub mod normalize;
pub mod parse;

pub use convert::{to_geo_line_string, to_geo_point};
pub use normalize::normalize_street_name;
pub use parse::parse_coordinates;
pub use trip_events_geometry_models::{Geometry, LatLon};

use thiserror::Error;

/// Errors that can occur while parsing a coordinate string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The string matched neither supported encoding.
    #[error("Invalid location '{input}': {reason}")]
    Malformed {
        /// The raw location string.
        input: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// A coordinate component was not a valid number.
    #[error("Invalid coordinate '{token}' in location '{input}'")]
    InvalidNumber {
        /// The raw location string.
        input: String,
        /// The component that failed to parse.
        token: String,
    },
}
