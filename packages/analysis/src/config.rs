//! Pipeline configuration.
//!
//! Defaults live in `config/default.toml`, embedded at compile time. User
//! overrides are parsed with [`AnalysisConfig::from_toml_str`]; any key
//! left out keeps its default.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use trip_events_events::{ClusterConfig, CorrelationConfig};
use trip_events_spatial::ZoneFieldMapping;
use trip_events_trips::TripFilterConfig;

use crate::AnalysisError;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Zone loading and attribution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Drop closure zone matches that repeat the previous match.
    pub suppress_repeated_zones: bool,
    /// `GeoJSON` property names for zone metadata.
    pub fields: ZoneFieldMapping,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            suppress_repeated_zones: true,
            fields: ZoneFieldMapping::default(),
        }
    }
}

/// Settings for every pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Zone loading and closure attribution.
    pub zones: ZoneConfig,
    /// Trip plausibility thresholds.
    pub trips: TripFilterConfig,
    /// Trip window tolerance.
    pub correlation: CorrelationConfig,
    /// Crash pairing and ranking.
    pub clusters: ClusterConfig,
}

impl AnalysisConfig {
    /// Parses a TOML document. Sections and keys that are absent keep
    /// their defaults.
    ///
    /// # Errors
    ///
    /// * If the document is not valid TOML or a value has the wrong type
    /// * If a duration value is out of range (see [`Self::validate`])
    pub fn from_toml_str(toml_str: &str) -> Result<Self, AnalysisError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every duration setting is representable and that the
    /// correlation tolerance and cluster gap are not negative.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::InvalidConfig`] naming the first offending key
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let checks = [
            (
                "trips.min_duration_seconds",
                self.trips.min_duration_seconds,
                self.trips.try_min_duration().is_some(),
            ),
            (
                "trips.max_duration_hours",
                self.trips.max_duration_hours,
                self.trips.try_max_duration().is_some(),
            ),
            (
                "correlation.tolerance_minutes",
                self.correlation.tolerance_minutes,
                self.correlation
                    .try_tolerance()
                    .is_some_and(|tolerance| tolerance >= TimeDelta::zero()),
            ),
            (
                "clusters.max_gap_minutes",
                self.clusters.max_gap_minutes,
                self.clusters
                    .try_max_gap()
                    .is_some_and(|gap| gap >= TimeDelta::zero()),
            ),
        ];

        match checks.into_iter().find(|(_, _, valid)| !valid) {
            Some((key, value, _)) => Err(AnalysisError::InvalidConfig { key, value }),
            None => Ok(()),
        }
    }

    /// The embedded default configuration.
    ///
    /// # Errors
    ///
    /// * If the embedded defaults fail to parse
    pub fn embedded() -> Result<Self, AnalysisError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }
}
