//! Parsing of the two coordinate encodings found in the source datasets.
//!
//! - `"(40.7128, -74.0060)"`: latitude first, produces a [`Geometry::Point`].
//! - `"LINESTRING (-74.0060 40.7128, -74.0010 40.7150)"`: longitude first,
//!   produces a [`Geometry::Path`].
//!
//! No range validation is performed here.

use trip_events_geometry_models::{Geometry, LatLon};

use crate::GeometryError;

const LINESTRING_PREFIX: &str = "LINESTRING";

/// Parses a location string into a [`Geometry`].
///
/// Strings starting with `LINESTRING` are parsed as paths, everything else
/// as a `"(lat, lon)"` point.
///
/// # Errors
///
/// Returns [`GeometryError`] if the string matches neither encoding or any
/// coordinate is not a number.
pub fn parse_coordinates(input: &str) -> Result<Geometry, GeometryError> {
    if let Some(body) = input.strip_prefix(LINESTRING_PREFIX) {
        parse_linestring(input, body)
    } else {
        parse_point(input)
    }
}

fn parse_linestring(input: &str, body: &str) -> Result<Geometry, GeometryError> {
    let Some(body) = body.trim_start().strip_prefix('(') else {
        return Err(malformed(input, "expected '(' after LINESTRING"));
    };
    let body = body.replace(')', "");

    let vertices = body
        .split(',')
        .map(|token| {
            let parts: Vec<&str> = token.split_whitespace().collect();
            let [lon, lat] = parts.as_slice() else {
                return Err(malformed(
                    input,
                    &format!("vertex '{}' is not a 'lon lat' pair", token.trim()),
                ));
            };
            // WKT order is (lon, lat)
            Ok(LatLon::new(number(input, lat)?, number(input, lon)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if vertices.len() < 2 {
        return Err(malformed(input, "a path needs at least two vertices"));
    }

    Ok(Geometry::Path(vertices))
}

fn parse_point(input: &str) -> Result<Geometry, GeometryError> {
    let body = input.trim().trim_matches(|c| c == '(' || c == ')');
    let parts: Vec<&str> = body.split(',').collect();

    let [lat, lon] = parts.as_slice() else {
        return Err(malformed(input, "expected '(lat, lon)'"));
    };

    Ok(Geometry::Point(LatLon::new(
        number(input, lat)?,
        number(input, lon)?,
    )))
}

fn number(input: &str, token: &str) -> Result<f64, GeometryError> {
    let token = token.trim();
    token
        .parse::<f64>()
        .map_err(|_| GeometryError::InvalidNumber {
            input: input.to_string(),
            token: token.to_string(),
        })
}

fn malformed(input: &str, reason: &str) -> GeometryError {
    GeometryError::Malformed {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &LatLon, lat: f64, lon: f64) {
        assert!((actual.lat - lat).abs() < 1e-12, "lat {} != {lat}", actual.lat);
        assert!((actual.lon - lon).abs() < 1e-12, "lon {} != {lon}", actual.lon);
    }

    #[test]
    fn parses_lat_lon_point() {
        let Geometry::Point(point) = parse_coordinates("(40.7128, -74.006)").unwrap() else {
            panic!("expected a point");
        };
        assert_close(&point, 40.7128, -74.006);
    }

    #[test]
    fn parses_point_without_space() {
        let Geometry::Point(point) = parse_coordinates("(40.5,-73.5)").unwrap() else {
            panic!("expected a point");
        };
        assert_close(&point, 40.5, -73.5);
    }

    #[test]
    fn linestring_swaps_axis_order() {
        let geometry =
            parse_coordinates("LINESTRING (-73.99 40.75, -73.98 40.76)").unwrap();
        let Geometry::Path(vertices) = geometry else {
            panic!("expected a path");
        };
        assert_eq!(vertices.len(), 2);
        assert_close(&vertices[0], 40.75, -73.99);
        assert_close(&vertices[1], 40.76, -73.98);
    }

    #[test]
    fn linestring_preserves_vertex_order() {
        let Geometry::Path(vertices) =
            parse_coordinates("LINESTRING (-73.9 40.1, -73.8 40.2, -73.7 40.3)").unwrap()
        else {
            panic!("expected a path");
        };
        let lats: Vec<f64> = vertices.iter().map(|v| v.lat).collect();
        assert_eq!(lats, vec![40.1, 40.2, 40.3]);
    }

    /// Latitudes from -90 to 90 and longitudes from -180 to 180, including
    /// fractional steps and both extremes.
    fn coordinate_grid() -> Vec<(f64, f64)> {
        (0..=16)
            .flat_map(|i| {
                (0..=24).map(move |j| {
                    (
                        f64::from(i).mul_add(11.25, -90.0),
                        f64::from(j).mul_add(15.0, -180.0),
                    )
                })
            })
            .collect()
    }

    #[test]
    fn every_grid_point_parses_back() {
        for (lat, lon) in coordinate_grid() {
            let input = format!("({lat}, {lon})");
            let Geometry::Point(point) = parse_coordinates(&input).unwrap() else {
                panic!("expected a point for {input}");
            };
            assert_eq!(point, LatLon::new(lat, lon), "{input}");
        }
    }

    #[test]
    fn every_grid_linestring_swaps_axes() {
        for (lat, lon) in coordinate_grid() {
            let (next_lat, next_lon) = (-lat, -lon);
            let input = format!("LINESTRING ({lon} {lat}, {next_lon} {next_lat})");
            let Geometry::Path(vertices) = parse_coordinates(&input).unwrap() else {
                panic!("expected a path for {input}");
            };
            assert_eq!(
                vertices,
                vec![LatLon::new(lat, lon), LatLon::new(next_lat, next_lon)],
                "{input}"
            );
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_coordinates("not a location"),
            Err(GeometryError::Malformed { .. })
        ));
        assert!(parse_coordinates("").is_err());
    }

    #[test]
    fn rejects_non_numeric_components() {
        assert!(matches!(
            parse_coordinates("(abc, -74.0)"),
            Err(GeometryError::InvalidNumber { token, .. }) if token == "abc"
        ));
    }

    #[test]
    fn rejects_three_component_point() {
        assert!(parse_coordinates("(1.0, 2.0, 3.0)").is_err());
    }

    #[test]
    fn rejects_single_vertex_linestring() {
        assert!(parse_coordinates("LINESTRING (-73.9 40.7)").is_err());
    }

    #[test]
    fn rejects_linestring_vertex_with_one_component() {
        assert!(parse_coordinates("LINESTRING (-73.9 40.7, -73.8)").is_err());
    }

    #[test]
    fn rejects_linestring_without_parenthesis() {
        assert!(parse_coordinates("LINESTRING -73.9 40.7, -73.8 40.8").is_err());
    }
}
