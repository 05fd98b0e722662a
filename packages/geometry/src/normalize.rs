//! Street name normalization for the closure → street geometry join.
//!
//! Applied symmetrically to closure records and to the street geometry
//! table so that `"BROADWAY"`, `"Broadway"` and `"broadway  "` all join.

use regex::Regex;
use std::sync::LazyLock;

/// Regex to collapse whitespace runs into a single space.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalizes a street name.
///
/// The pipeline:
/// 1. Lowercase
/// 2. Collapse whitespace runs
/// 3. Trim
#[must_use]
pub fn normalize_street_name(name: &str) -> String {
    let lower = name.to_lowercase();
    WHITESPACE_RE.replace_all(&lower, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases() {
        assert_eq!(normalize_street_name("BROADWAY"), "broadway");
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(
            normalize_street_name("WEST   42 \t STREET"),
            "west 42 street"
        );
    }

    #[test]
    fn trims_edges() {
        assert_eq!(normalize_street_name("  5 avenue "), "5 avenue");
    }

    #[test]
    fn both_sides_agree() {
        assert_eq!(
            normalize_street_name("East  Houston Street"),
            normalize_street_name("EAST HOUSTON STREET")
        );
    }
}
