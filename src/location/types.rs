//! Core types for place resolution.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::overpass::Bounds;

/// A named place plus the admin levels to try, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery {
    pub name: String,
    pub admin_levels: Vec<u8>,
}

impl PlaceQuery {
    pub fn new(name: impl Into<String>, admin_levels: &[u8]) -> Self {
        Self {
            name: name.into(),
            admin_levels: admin_levels.to_vec(),
        }
    }
}

/// Axis-aligned box in WGS84. Always `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Build from two corners in any order.
    pub fn from_corners(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> Self {
        Self {
            min_lat: lat_a.min(lat_b),
            min_lon: lon_a.min(lon_b),
            max_lat: lat_a.max(lat_b),
            max_lon: lon_a.max(lon_b),
        }
    }
}

impl From<Bounds> for BoundingBox {
    fn from(b: Bounds) -> Self {
        Self::from_corners(b.minlat, b.minlon, b.maxlat, b.maxlon)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.4}, {:.4}] .. [{:.4}, {:.4}]",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Where an amenity query looks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpatialScope {
    Area(BoundingBox),
    Radius { center: Coordinate, radius_m: u32 },
}

/// Terminal result of a single resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome<T> {
    Success(T),
    /// More than one match at the same admin level; distinct display names.
    Ambiguous(BTreeSet<String>),
    NotFound,
    /// A feature matched but carried no usable coordinates.
    CoordinatesUndetermined,
}

impl<T> ResolutionOutcome<T> {
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Ambiguous(_) => "ambiguous",
            Self::NotFound => "not_found",
            Self::CoordinatesUndetermined => "coordinates_undetermined",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_orders_axes() {
        let b = BoundingBox::from_corners(27.0, 84.0, 26.0, 83.0);
        assert_eq!(b.min_lat, 26.0);
        assert_eq!(b.max_lat, 27.0);
        assert_eq!(b.min_lon, 83.0);
        assert_eq!(b.max_lon, 84.0);
    }

    #[test]
    fn test_from_bounds_swapped() {
        let b: BoundingBox = Bounds { minlat: 10.0, minlon: 20.0, maxlat: 5.0, maxlon: 25.0 }.into();
        assert!(b.min_lat <= b.max_lat);
        assert!(b.min_lon <= b.max_lon);
    }

    #[test]
    fn test_outcome_success() {
        let o: ResolutionOutcome<u8> = ResolutionOutcome::Success(3);
        assert_eq!(o.label(), "success");
        assert_eq!(o.success(), Some(3));
        assert_eq!(ResolutionOutcome::<u8>::NotFound.success(), None);
    }

    #[test]
    fn test_scope_serializes_tagged() {
        let scope = SpatialScope::Radius {
            center: Coordinate { lat: 1.0, lon: 2.0 },
            radius_m: 2000,
        };
        let v = serde_json::to_value(scope).unwrap();
        assert_eq!(v["kind"], "radius");
        assert_eq!(v["radius_m"], 2000);
    }
}
