//! Builds [`Zone`]s from the taxi zone `GeoJSON` partition.
//!
//! The TLC publishes zones as a `FeatureCollection` of `MultiPolygon`
//! features whose properties carry the zone id, borough and zone name.
//! Property names are configurable through [`ZoneFieldMapping`].

use geo::MultiPolygon;
use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use trip_events_zone_models::ZoneId;

use crate::{SpatialError, Zone};

/// Property names used to extract zone metadata from each feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneFieldMapping {
    /// Property holding the numeric zone id (number or numeric string).
    pub id: String,
    /// Property holding the borough name.
    pub borough: String,
    /// Property holding the zone name.
    pub name: String,
}

impl Default for ZoneFieldMapping {
    fn default() -> Self {
        Self {
            id: "objectid".to_string(),
            borough: "borough".to_string(),
            name: "zone".to_string(),
        }
    }
}

/// Parses a `GeoJSON` `FeatureCollection` into zones, in feature order.
///
/// Features without a usable polygon geometry or zone id are skipped with
/// a warning.
///
/// # Errors
///
/// Returns [`SpatialError`] if the document is not valid `GeoJSON` or is
/// not a `FeatureCollection`.
pub fn zones_from_geojson(
    geojson_str: &str,
    fields: &ZoneFieldMapping,
) -> Result<Vec<Zone>, SpatialError> {
    let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
        return Err(SpatialError::NotAFeatureCollection);
    };

    let total = collection.features.len();
    let zones: Vec<Zone> = collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(i, mut feature)| {
            let Some(id) = feature.property(&fields.id).and_then(parse_zone_id) else {
                log::warn!("Skipping feature {i}: missing or invalid '{}'", fields.id);
                return None;
            };

            let Some(boundary) = feature.geometry.take().and_then(to_multipolygon) else {
                log::warn!("Failed to parse polygon geometry for zone {id}");
                return None;
            };

            Some(Zone {
                id,
                name: string_property(&feature, &fields.name),
                borough: string_property(&feature, &fields.borough),
                boundary,
            })
        })
        .collect();

    if zones.len() < total {
        log::warn!("Loaded {} of {total} zone features", zones.len());
    }

    Ok(zones)
}

fn parse_zone_id(value: &serde_json::Value) -> Option<ZoneId> {
    let id: u32 = match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok())?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(ZoneId(id))
}

fn string_property(feature: &geojson::Feature, key: &str) -> String {
    feature
        .property(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
