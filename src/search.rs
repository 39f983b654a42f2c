//! The geocode-then-query pipeline.
//!
//! City flow:   region resolver -> amenity engine (bbox) -> normalizer
//! Landmark flow: point resolver -> amenity engine (radius) -> normalizer
//!
//! Outcomes stay structured here; [`crate::tools`] flattens them to text.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::amenity::{normalize, AmenityFilter, AmenityQueryEngine, NormalizedResult};
use crate::config::SearchConfig;
use crate::location::{
    BoundingBox, Coordinate, PointResolver, RegionResolver, ResolutionOutcome, SpatialScope,
};
use crate::overpass::{OverpassError, Transport};

/// Which external call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FindingCity,
    SearchingCity,
    FindingLandmark,
    SearchingNearLandmark,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindingCity => write!(f, "finding city"),
            Self::SearchingCity => write!(f, "searching for amenities"),
            Self::FindingLandmark => write!(f, "finding point of interest"),
            Self::SearchingNearLandmark => write!(f, "searching for amenities near point"),
        }
    }
}

/// Pipeline failures. `Display` is the collaborator-facing prose.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(
        "Error: Ambiguous city name. Found multiple locations for '{query}'. Please ask the user to be more specific. Did they mean one of: {}?",
        join(.candidates)
    )]
    Ambiguous {
        query: String,
        candidates: BTreeSet<String>,
    },
    #[error("Error: Could not find a bounding box for the city '{0}'.")]
    RegionNotFound(String),
    #[error("Error: Could not find a location named '{0}'.")]
    LandmarkNotFound(String),
    #[error("Error: Found '{0}' but could not determine its exact coordinates.")]
    CoordinatesUndetermined(String),
    #[error("Network error while {stage}: {source}")]
    Network {
        stage: Stage,
        #[source]
        source: OverpassError,
    },
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl SearchError {
    /// Stable machine-readable kind for callers that branch on errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ambiguous { .. } => "ambiguous",
            Self::RegionNotFound(_) | Self::LandmarkNotFound(_) => "not_found",
            Self::CoordinatesUndetermined(_) => "coordinates_undetermined",
            Self::Network { .. } => "network",
        }
    }

    fn network(stage: Stage) -> impl FnOnce(OverpassError) -> Self {
        move |source| Self::Network { stage, source }
    }
}

/// Successful city-wide search.
#[derive(Debug, Clone, Serialize)]
pub struct CitySearchReport {
    pub city: String,
    #[serde(rename = "amenity_type_searched", serialize_with = "filter_label")]
    pub filter: AmenityFilter,
    pub bbox: BoundingBox,
    /// Features returned by Overpass before dropping unnamed ones.
    pub raw_count: usize,
    pub results: Vec<NormalizedResult>,
}

/// Successful search around a landmark.
#[derive(Debug, Clone, Serialize)]
pub struct PointSearchReport {
    pub point_of_interest: String,
    #[serde(rename = "amenity_type_searched", serialize_with = "filter_label")]
    pub filter: AmenityFilter,
    pub center: Coordinate,
    pub radius_m: u32,
    pub raw_count: usize,
    pub results: Vec<NormalizedResult>,
}

fn filter_label<S: serde::Serializer>(filter: &AmenityFilter, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(filter.label())
}

impl CitySearchReport {
    /// The scope was valid but Overpass matched nothing.
    pub fn is_empty(&self) -> bool {
        self.raw_count == 0
    }
}

impl PointSearchReport {
    pub fn is_empty(&self) -> bool {
        self.raw_count == 0
    }
}

/// Owns the transport and runs both pipelines. One request at a time.
pub struct GeoSearch<T: Transport> {
    transport: T,
    config: SearchConfig,
}

impl<T: Transport> GeoSearch<T> {
    pub fn new(transport: T, config: SearchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn search_city(&self, city: &str, amenity: Option<&str>) -> Result<CitySearchReport, SearchError> {
        let filter = AmenityFilter::from_option(amenity.map(str::to_string));

        let bbox = match RegionResolver::new(&self.transport, &self.config)
            .resolve(city)
            .map_err(SearchError::network(Stage::FindingCity))?
        {
            ResolutionOutcome::Success(bbox) => bbox,
            ResolutionOutcome::Ambiguous(candidates) => {
                return Err(SearchError::Ambiguous {
                    query: city.to_string(),
                    candidates,
                })
            }
            ResolutionOutcome::NotFound | ResolutionOutcome::CoordinatesUndetermined => {
                return Err(SearchError::RegionNotFound(city.to_string()))
            }
        };

        let features = AmenityQueryEngine::new(&self.transport, &self.config)
            .query(&SpatialScope::Area(bbox), &filter)
            .map_err(SearchError::network(Stage::SearchingCity))?;
        let results = normalize(&features);
        info!(city, amenity = %filter, raw = features.len(), named = results.len(), "city search done");

        Ok(CitySearchReport {
            city: city.to_string(),
            filter,
            bbox,
            raw_count: features.len(),
            results,
        })
    }

    pub fn search_near_point(&self, poi: &str, amenity: &str) -> Result<PointSearchReport, SearchError> {
        self.search_near_point_within(poi, amenity, self.config.radius_m)
    }

    pub fn search_near_point_within(
        &self,
        poi: &str,
        amenity: &str,
        radius_m: u32,
    ) -> Result<PointSearchReport, SearchError> {
        let filter = AmenityFilter::from_option(Some(amenity.to_string()));

        let center = match PointResolver::new(&self.transport, &self.config)
            .resolve(poi)
            .map_err(SearchError::network(Stage::FindingLandmark))?
        {
            ResolutionOutcome::Success(c) => c,
            ResolutionOutcome::CoordinatesUndetermined => {
                return Err(SearchError::CoordinatesUndetermined(poi.to_string()))
            }
            ResolutionOutcome::NotFound | ResolutionOutcome::Ambiguous(_) => {
                return Err(SearchError::LandmarkNotFound(poi.to_string()))
            }
        };

        let scope = SpatialScope::Radius { center, radius_m };
        let features = AmenityQueryEngine::new(&self.transport, &self.config)
            .query(&scope, &filter)
            .map_err(SearchError::network(Stage::SearchingNearLandmark))?;
        let results = normalize(&features);
        info!(poi, amenity = %filter, raw = features.len(), named = results.len(), "landmark search done");

        Ok(PointSearchReport {
            point_of_interest: poi.to_string(),
            filter,
            center,
            radius_m,
            raw_count: features.len(),
            results,
        })
    }
}

#[cfg(test)]
impl GeoSearch<crate::overpass::testing::ScriptedTransport> {
    pub(crate) fn transport_queries(&self) -> Vec<String> {
        self.transport.queries()
    }
}
