//! Wire types for Overpass API responses.
//!
//! Elements are heterogeneous: nodes carry `lat`/`lon`, ways and relations
//! carry `center` (with `out center`) or `bounds` (with `out bb`). Every
//! field that may be missing is an explicit `Option`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// The JSON envelope returned by the interpreter endpoint.
///
/// `remark` carries server-side runtime messages. A query that hits its
/// `[timeout:N]` still answers HTTP 200, with the failure only in `remark`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub remark: Option<String>,
}

impl OverpassResponse {
    /// True when a remark reports a failed query rather than a note.
    pub fn is_runtime_failure(remark: &str) -> bool {
        let remark = remark.trim();
        remark.starts_with("runtime error") || remark.contains("timed out")
    }
}

/// A single tagged OSM element as returned by Overpass.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Element {
    #[serde(default, rename = "type")]
    pub element_type: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Computed center of a way or relation.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Center {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Bounding box attached to an element by `out bb`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Bounds {
    pub minlat: f64,
    pub minlon: f64,
    pub maxlat: f64,
    pub maxlon: f64,
}

impl Element {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.tag("name")
    }

    pub fn amenity(&self) -> Option<&str> {
        self.tag("amenity")
    }

    /// `(lat, lon)` from the computed center, if both halves are present.
    pub fn center_coordinate(&self) -> Option<(f64, f64)> {
        let c = self.center?;
        Some((c.lat?, c.lon?))
    }

    /// `(lat, lon)` from the element's own attributes (nodes only).
    pub fn direct_coordinate(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.element_type.as_deref().unwrap_or("element");
        match self.id {
            Some(id) => write!(f, "{}/{}", kind, id)?,
            None => write!(f, "{}", kind)?,
        }
        if let Some(name) = self.name() {
            write!(f, " \"{}\"", name)?;
        }
        Ok(())
    }
}
