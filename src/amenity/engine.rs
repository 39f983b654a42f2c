//! Amenity query engine: spatial scope + filter -> raw Overpass features.

use tracing::{debug, info};

use super::AmenityFilter;
use crate::config::SearchConfig;
use crate::location::SpatialScope;
use crate::overpass::{Element, OverpassError, OverpassQuery, Transport};

pub struct AmenityQueryEngine<'a, T: Transport> {
    transport: &'a T,
    area_timeout_secs: u64,
    radius_timeout_secs: u64,
}

impl<'a, T: Transport> AmenityQueryEngine<'a, T> {
    pub fn new(transport: &'a T, config: &SearchConfig) -> Self {
        Self {
            transport,
            area_timeout_secs: config.area_timeout_secs,
            radius_timeout_secs: config.radius_timeout_secs,
        }
    }

    /// Build the query for `scope` without sending it.
    pub fn build(&self, scope: &SpatialScope, filter: &AmenityFilter) -> OverpassQuery {
        match scope {
            SpatialScope::Area(bbox) => OverpassQuery::amenities_in_bbox(bbox, filter, self.area_timeout_secs),
            SpatialScope::Radius { center, radius_m } => {
                OverpassQuery::amenities_around(center, *radius_m, filter, self.radius_timeout_secs)
            }
        }
    }

    /// Raw features in scope. An empty vec means the query ran and matched nothing.
    pub fn query(&self, scope: &SpatialScope, filter: &AmenityFilter) -> Result<Vec<Element>, OverpassError> {
        let request = self.build(scope, filter);
        debug!(?scope, amenity = %filter, "amenity query");
        let elements = self.transport.execute(&request)?.elements;
        info!(amenity = %filter, features = elements.len(), "amenity query complete");
        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{BoundingBox, Coordinate};
    use crate::overpass::testing::ScriptedTransport;
    use serde_json::json;

    #[test]
    fn test_area_scope_queries_nodes_and_ways() {
        let t = ScriptedTransport::new().reply(json!({"elements": [
            {"type": "node", "id": 1, "tags": {"amenity": "hospital", "name": "A"}},
            {"type": "way", "id": 2, "center": {"lat": 1.0, "lon": 1.0}, "tags": {"amenity": "hospital"}}
        ]}));
        let engine = AmenityQueryEngine::new(&t, &SearchConfig::default());
        let scope = SpatialScope::Area(BoundingBox::from_corners(26.5, 83.25, 26.75, 83.5));
        let features = engine.query(&scope, &AmenityFilter::exact("hospital")).unwrap();

        assert_eq!(features.len(), 2);
        let q = &t.queries()[0];
        assert!(q.starts_with("[out:json][timeout:90];"));
        assert!(q.contains(r#"node["amenity"="hospital"](26.5,83.25,26.75,83.5)"#));
        assert!(q.contains(r#"way["amenity"="hospital"](26.5,83.25,26.75,83.5)"#));
        assert!(q.ends_with("out center;"));
    }

    #[test]
    fn test_radius_scope_without_filter() {
        let t = ScriptedTransport::new().empty();
        let engine = AmenityQueryEngine::new(&t, &SearchConfig::default());
        let scope = SpatialScope::Radius {
            center: Coordinate { lat: 48.5, lon: 2.25 },
            radius_m: 2000,
        };
        let features = engine.query(&scope, &AmenityFilter::any()).unwrap();

        assert!(features.is_empty());
        assert_eq!(
            t.queries()[0],
            r#"[out:json][timeout:60]; node(around:2000,48.5,2.25)["amenity"]; out body;"#
        );
    }

    #[test]
    fn test_transport_failure_is_not_empty_result() {
        let t = ScriptedTransport::new().fail(OverpassError::Network("timed out".into()));
        let engine = AmenityQueryEngine::new(&t, &SearchConfig::default());
        let scope = SpatialScope::Area(BoundingBox::from_corners(0.0, 0.0, 1.0, 1.0));
        assert!(engine.query(&scope, &AmenityFilter::any()).is_err());
    }

    #[test]
    fn test_timeouts_follow_config() {
        let t = ScriptedTransport::new();
        let config = SearchConfig {
            area_timeout_secs: 120,
            ..SearchConfig::default()
        };
        let engine = AmenityQueryEngine::new(&t, &config);
        let scope = SpatialScope::Area(BoundingBox::from_corners(0.0, 0.0, 1.0, 1.0));
        assert!(engine.build(&scope, &AmenityFilter::any()).as_str().starts_with("[out:json][timeout:120];"));
    }

    #[test]
    fn test_unfiltered_query_widens_only_the_tag_clause() {
        let t = ScriptedTransport::new();
        let engine = AmenityQueryEngine::new(&t, &SearchConfig::default());
        let scopes = [
            SpatialScope::Area(BoundingBox::from_corners(26.6, 83.2, 26.9, 83.5)),
            SpatialScope::Radius {
                center: Coordinate { lat: 48.8584, lon: 2.2945 },
                radius_m: 2000,
            },
        ];

        for scope in &scopes {
            let any = engine.build(scope, &AmenityFilter::any()).as_str().to_string();
            for category in ["cafe", "hospital"] {
                let filtered = engine.build(scope, &AmenityFilter::exact(category)).as_str().to_string();
                let specific = format!(r#"["amenity"="{}"]"#, category);
                assert!(filtered.contains(&specific));
                assert!(!any.contains("[\"amenity\"="));
                assert_eq!(filtered.replace(&specific, r#"["amenity"]"#), any);
            }
        }
    }
}
