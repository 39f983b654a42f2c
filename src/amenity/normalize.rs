//! Raw features -> flat, name-bearing result list.

use serde::Serialize;

use crate::overpass::Element;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedResult {
    pub name: String,
    #[serde(rename = "amenity")]
    pub category: Option<String>,
}

/// Keep features that have a `name` tag, in response order.
pub fn normalize(features: &[Element]) -> Vec<NormalizedResult> {
    features
        .iter()
        .filter_map(|el| {
            Some(NormalizedResult {
                name: el.name()?.to_string(),
                category: el.amenity().map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn features(v: serde_json::Value) -> Vec<Element> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_drops_unnamed_preserves_order() {
        let els = features(json!([
            {"type": "node", "tags": {"name": "Zeta Clinic", "amenity": "clinic"}},
            {"type": "node", "tags": {"amenity": "bench"}},
            {"type": "way", "tags": {"name": "Alpha School", "amenity": "school"}},
            {"type": "node"},
            {"type": "node", "tags": {"name": "Zeta Clinic", "amenity": "clinic"}}
        ]));
        let out = normalize(&els);

        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Zeta Clinic", "Alpha School", "Zeta Clinic"]);
        assert!(out.len() <= els.len());
    }

    #[test]
    fn test_category_optional() {
        let els = features(json!([{"type": "node", "tags": {"name": "Somewhere"}}]));
        let out = normalize(&els);
        assert_eq!(out[0].category, None);
        assert_eq!(
            serde_json::to_value(&out[0]).unwrap(),
            json!({"name": "Somewhere", "amenity": null})
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize(&[]).is_empty());
    }
}
