#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Taxi zone identifiers and borough definitions.
//!
//! The NYC TLC partitions the city into 263 numbered taxi zones, each
//! belonging to a borough. Street closure records identify their borough
//! with a single-letter code while the zone partition spells the borough
//! out, so [`borough_matches`] bridges the two.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Highest zone id in the TLC taxi zone partition. Ids 264 and 265 appear
/// in trip data as "unknown" placeholders.
pub const MAX_TAXI_ZONE_ID: u32 = 263;

/// Identifier of a taxi zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ZoneId(pub u32);

impl ZoneId {
    /// Returns the raw numeric id.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Whether this id falls inside `1..=max_id`.
    #[must_use]
    pub const fn is_within(self, max_id: u32) -> bool {
        self.0 >= 1 && self.0 <= max_id
    }
}

impl From<u32> for ZoneId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the five New York City boroughs.
///
/// `Display`/`FromStr` use the borough name as spelled in the taxi zone
/// partition.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Borough {
    /// Code `B`.
    Brooklyn,
    /// Code `S`.
    #[serde(rename = "Staten Island")]
    #[strum(serialize = "Staten Island")]
    StatenIsland,
    /// Code `M`.
    Manhattan,
    /// Code `Q`.
    Queens,
    /// Code `X`.
    Bronx,
}

impl Borough {
    /// Returns the single-letter code used by street closure records.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Brooklyn => "B",
            Self::StatenIsland => "S",
            Self::Manhattan => "M",
            Self::Queens => "Q",
            Self::Bronx => "X",
        }
    }

    /// Looks up a borough by its single-letter code. Exact match only.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|b| b.code() == code)
    }

    /// Looks up a borough by its full name. Exact match only.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Brooklyn,
            Self::StatenIsland,
            Self::Manhattan,
            Self::Queens,
            Self::Bronx,
        ]
    }
}

/// Whether a closure borough code and a zone borough name refer to the
/// same borough.
///
/// Unknown codes and names that are not one of the five boroughs (e.g.
/// `"EWR"`) never match.
#[must_use]
pub fn borough_matches(code: &str, name: &str) -> bool {
    match (Borough::from_code(code), Borough::from_name(name)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: [(&str, &str); 5] = [
        ("B", "Brooklyn"),
        ("S", "Staten Island"),
        ("M", "Manhattan"),
        ("Q", "Queens"),
        ("X", "Bronx"),
    ];

    #[test]
    fn matches_every_valid_pair() {
        for (code, name) in PAIRS {
            assert!(borough_matches(code, name), "{code} should match {name}");
        }
    }

    #[test]
    fn rejects_every_mismatched_pair() {
        let mut negatives = 0;
        for (i, (code, _)) in PAIRS.iter().enumerate() {
            for (j, (_, name)) in PAIRS.iter().enumerate() {
                if i != j {
                    assert!(!borough_matches(code, name), "{code} matched {name}");
                    negatives += 1;
                }
            }
        }
        assert_eq!(negatives, 20);
    }

    #[test]
    fn rejects_unknown_codes_and_names() {
        assert!(!borough_matches("Z", "Brooklyn"));
        assert!(!borough_matches("", "Queens"));
        assert!(!borough_matches("M", "EWR"));
        assert!(!borough_matches("m", "Manhattan"));
        assert!(!borough_matches("M", "manhattan"));
    }

    #[test]
    fn display_uses_zone_spelling() {
        assert_eq!(Borough::StatenIsland.to_string(), "Staten Island");
        assert_eq!(Borough::from_name("Staten Island"), Some(Borough::StatenIsland));
    }

    #[test]
    fn zone_id_range_check() {
        assert!(ZoneId(1).is_within(MAX_TAXI_ZONE_ID));
        assert!(ZoneId(263).is_within(MAX_TAXI_ZONE_ID));
        assert!(!ZoneId(0).is_within(MAX_TAXI_ZONE_ID));
        assert!(!ZoneId(264).is_within(MAX_TAXI_ZONE_ID));
    }
}
