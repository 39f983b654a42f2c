//! Collaborator-facing tools.
//!
//! A function-calling agent registers [`tool_specs`] and sends back
//! [`ToolCall`]s. Every call returns a string: a JSON object on success,
//! a `Success: ...` sentence when nothing matched, or prose starting with
//! `Error:` / `Network error` otherwise.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::amenity::NormalizedResult;
use crate::overpass::Transport;
use crate::search::{CitySearchReport, GeoSearch, PointSearchReport, SearchError};

pub const CITY_WIDE_AMENITY_SEARCH: &str = "city_wide_amenity_search";
pub const POINT_OF_INTEREST_AMENITY_SEARCH: &str = "point_of_interest_amenity_search";

/// Tool definition as advertised to the language model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: CITY_WIDE_AMENITY_SEARCH,
            description: "Use this tool to find amenities within an entire city or district. \
                If the user provides a specific amenity_type (e.g., 'hospital'), it will search for that type. \
                If the amenity_type is NOT provided, it will perform a general search for all available amenities in that city.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "city_or_district": {
                        "type": "string",
                        "description": "The city or district to search within, e.g., 'Gorakhpur' or 'Delhi'."
                    },
                    "amenity_type": {
                        "type": ["string", "null"],
                        "description": "The type of amenity to search for, e.g., 'hospital', 'cafe'. This is optional; omit it for a general search of all amenities."
                    }
                },
                "required": ["city_or_district"]
            }),
        },
        ToolSpec {
            name: POINT_OF_INTEREST_AMENITY_SEARCH,
            description: "Use this tool ONLY when a user asks to find something near a specific named landmark or building (NOT a whole city).",
            parameters: json!({
                "type": "object",
                "properties": {
                    "point_of_interest": {
                        "type": "string",
                        "description": "The specific landmark or building to search near, e.g., 'Eiffel Tower'."
                    },
                    "amenity_type": {
                        "type": "string",
                        "description": "The type of amenity to search for, e.g., 'hospital', 'cafe'."
                    }
                },
                "required": ["point_of_interest", "amenity_type"]
            }),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityWideArgs {
    pub city_or_district: String,
    #[serde(default)]
    pub amenity_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PointOfInterestArgs {
    pub point_of_interest: String,
    pub amenity_type: String,
}

/// `{"name": "...", "arguments": {...}}` as emitted by the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolCall {
    CityWideAmenitySearch(CityWideArgs),
    PointOfInterestAmenitySearch(PointOfInterestArgs),
}

impl ToolCall {
    /// Parse a call; some models send `arguments` as a JSON-encoded string.
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Some(Value::String(encoded)) = value.get("arguments") {
            let parsed: Value = serde_json::from_str(encoded)?;
            value["arguments"] = parsed;
        }
        serde_json::from_value(value)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CityWideAmenitySearch(_) => CITY_WIDE_AMENITY_SEARCH,
            Self::PointOfInterestAmenitySearch(_) => POINT_OF_INTEREST_AMENITY_SEARCH,
        }
    }
}

#[derive(Serialize)]
struct CityPayload<'a> {
    search_city: &'a str,
    amenity_type_searched: &'a str,
    results: &'a [NormalizedResult],
}

#[derive(Serialize)]
struct PointPayload<'a> {
    search_poi: &'a str,
    amenity_type_searched: &'a str,
    results: &'a [NormalizedResult],
}

impl<T: Transport> GeoSearch<T> {
    pub fn city_wide_amenity_search(&self, city_or_district: &str, amenity_type: Option<&str>) -> String {
        render_city(self.search_city(city_or_district, amenity_type))
    }

    pub fn point_of_interest_amenity_search(&self, point_of_interest: &str, amenity_type: &str) -> String {
        render_point(self.search_near_point(point_of_interest, amenity_type))
    }

    pub fn dispatch(&self, call: &ToolCall) -> String {
        match call {
            ToolCall::CityWideAmenitySearch(a) => {
                self.city_wide_amenity_search(&a.city_or_district, a.amenity_type.as_deref())
            }
            ToolCall::PointOfInterestAmenitySearch(a) => {
                self.point_of_interest_amenity_search(&a.point_of_interest, &a.amenity_type)
            }
        }
    }

    /// Parse and run a raw tool call; malformed input becomes an error string.
    pub fn dispatch_value(&self, value: Value) -> String {
        match ToolCall::from_value(value) {
            Ok(call) => self.dispatch(&call),
            Err(e) => format!("Error: Invalid tool call: {}", e),
        }
    }
}

pub fn render_city(outcome: Result<CitySearchReport, SearchError>) -> String {
    let report = match outcome {
        Ok(r) => r,
        Err(e) => return render_error(&e),
    };
    if report.is_empty() {
        let what = match report.filter.category() {
            Some(c) => format!("'{}' facilities", c),
            None => "amenities".to_string(),
        };
        return format!(
            "Success: Found the city '{}', but no {} were found inside its boundaries.",
            report.city, what
        );
    }
    encode(&CityPayload {
        search_city: &report.city,
        amenity_type_searched: report.filter.label(),
        results: &report.results,
    })
}

pub fn render_point(outcome: Result<PointSearchReport, SearchError>) -> String {
    let report = match outcome {
        Ok(r) => r,
        Err(e) => return render_error(&e),
    };
    if report.is_empty() {
        return format!(
            "Success: Found '{}', but no '{}' facilities were found within a {} radius.",
            report.point_of_interest,
            report.filter.label(),
            format_radius(report.radius_m)
        );
    }
    encode(&PointPayload {
        search_poi: &report.point_of_interest,
        amenity_type_searched: report.filter.label(),
        results: &report.results,
    })
}

fn render_error(e: &SearchError) -> String {
    if matches!(e, SearchError::Network { .. }) {
        warn!(error = %e, "search failed upstream");
    }
    e.to_string()
}

fn encode<S: Serialize>(payload: &S) -> String {
    serde_json::to_string(payload).unwrap_or_else(|e| format!("Error: Could not encode results: {}", e))
}

/// 2000 -> "2km", 1500 -> "1.5km", 750 -> "750m".
pub fn format_radius(radius_m: u32) -> String {
    if radius_m >= 1000 {
        let km = radius_m as f64 / 1000.0;
        format!("{}km", km)
    } else {
        format!("{}m", radius_m)
    }
}
