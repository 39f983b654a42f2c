//! Overpass QL query construction.
//!
//! Query texts match the interpreter's expectations exactly; only quoted
//! values vary.

use std::fmt;
use std::time::Duration;

use crate::amenity::AmenityFilter;
use crate::location::{BoundingBox, Coordinate};

/// A ready-to-send Overpass QL query plus its server-side timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassQuery {
    text: String,
    timeout_secs: u64,
}

impl OverpassQuery {
    /// Administrative boundary relations named `name` at `admin_level`, with bounding boxes.
    pub fn boundary_relation(name: &str, admin_level: u8, timeout_secs: u64) -> Self {
        let text = format!(
            "[out:json][timeout:{}]; relation[\"name\"={}][\"admin_level\"=\"{}\"]; out bb;",
            timeout_secs,
            quote(name),
            admin_level,
        );
        Self { text, timeout_secs }
    }

    /// Any node, way or relation named `name`, with computed centers.
    pub fn named_feature(name: &str, timeout_secs: u64) -> Self {
        let text = format!(
            "[out:json][timeout:{}]; nwr[\"name\"={}]; out center;",
            timeout_secs,
            quote(name),
        );
        Self { text, timeout_secs }
    }

    /// Amenity nodes and ways inside a bounding box.
    pub fn amenities_in_bbox(bbox: &BoundingBox, filter: &AmenityFilter, timeout_secs: u64) -> Self {
        let f = amenity_clause(filter);
        let area = format!("({},{},{},{})", bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon);
        let text = format!(
            "[out:json][timeout:{}];(node{}{};way{}{};);out center;",
            timeout_secs, f, area, f, area,
        );
        Self { text, timeout_secs }
    }

    /// Amenity nodes within `radius_m` meters of `center`.
    pub fn amenities_around(
        center: &Coordinate,
        radius_m: u32,
        filter: &AmenityFilter,
        timeout_secs: u64,
    ) -> Self {
        let text = format!(
            "[out:json][timeout:{}]; node(around:{},{},{}){}; out body;",
            timeout_secs,
            radius_m,
            center.lat,
            center.lon,
            amenity_clause(filter),
        );
        Self { text, timeout_secs }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Display for OverpassQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// `["amenity"="cafe"]` for an exact match, `["amenity"]` for tag existence.
fn amenity_clause(filter: &AmenityFilter) -> String {
    match filter.category() {
        Some(category) => format!("[\"amenity\"={}]", quote(category)),
        None => "[\"amenity\"]".to_string(),
    }
}

/// Double-quoted QL string literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_relation_text() {
        let q = OverpassQuery::boundary_relation("Gorakhpur", 8, 30);
        assert_eq!(
            q.as_str(),
            r#"[out:json][timeout:30]; relation["name"="Gorakhpur"]["admin_level"="8"]; out bb;"#
        );
        assert_eq!(q.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_named_feature_text() {
        let q = OverpassQuery::named_feature("Eiffel Tower", 30);
        assert_eq!(q.as_str(), r#"[out:json][timeout:30]; nwr["name"="Eiffel Tower"]; out center;"#);
    }

    #[test]
    fn test_bbox_with_filter() {
        let bbox = BoundingBox::from_corners(26.5, 83.25, 26.75, 83.5);
        let q = OverpassQuery::amenities_in_bbox(&bbox, &AmenityFilter::exact("hospital"), 90);
        assert_eq!(
            q.as_str(),
            r#"[out:json][timeout:90];(node["amenity"="hospital"](26.5,83.25,26.75,83.5);way["amenity"="hospital"](26.5,83.25,26.75,83.5););out center;"#
        );
    }

    #[test]
    fn test_bbox_without_filter_is_existence_check() {
        let bbox = BoundingBox::from_corners(1.5, 2.5, 3.5, 4.5);
        let q = OverpassQuery::amenities_in_bbox(&bbox, &AmenityFilter::any(), 90);
        assert_eq!(
            q.as_str(),
            r#"[out:json][timeout:90];(node["amenity"](1.5,2.5,3.5,4.5);way["amenity"](1.5,2.5,3.5,4.5););out center;"#
        );
    }

    #[test]
    fn test_around_text() {
        let c = Coordinate { lat: 48.8584, lon: 2.2945 };
        let q = OverpassQuery::amenities_around(&c, 2000, &AmenityFilter::exact("cafe"), 60);
        assert_eq!(
            q.as_str(),
            r#"[out:json][timeout:60]; node(around:2000,48.8584,2.2945)["amenity"="cafe"]; out body;"#
        );
        assert_eq!(q.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_quotes_are_escaped() {
        let q = OverpassQuery::named_feature(r#"Joe's "Best" \ Bar"#, 30);
        assert!(q.as_str().contains(r#"nwr["name"="Joe's \"Best\" \\ Bar"]"#));
    }
}
