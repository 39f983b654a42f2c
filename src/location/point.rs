//! Point resolver: landmark name -> one representative coordinate.

use tracing::{debug, info};

use super::types::{Coordinate, ResolutionOutcome};
use crate::config::SearchConfig;
use crate::overpass::{Element, OverpassError, OverpassQuery, Transport};

pub struct PointResolver<'a, T: Transport> {
    transport: &'a T,
    timeout_secs: u64,
}

impl<'a, T: Transport> PointResolver<'a, T> {
    pub fn new(transport: &'a T, config: &SearchConfig) -> Self {
        Self {
            transport,
            timeout_secs: config.landmark_timeout_secs,
        }
    }

    /// Look up any node/way/relation named `name` and locate the first hit.
    pub fn resolve(&self, name: &str) -> Result<ResolutionOutcome<Coordinate>, OverpassError> {
        let request = OverpassQuery::named_feature(name, self.timeout_secs);
        let elements = self.transport.execute(&request)?.elements;
        debug!(landmark = name, matches = elements.len(), "landmark lookup");

        let Some(first) = elements.first() else {
            info!(landmark = name, "landmark not found");
            return Ok(ResolutionOutcome::NotFound);
        };

        let outcome = match locate(first) {
            Some(c) => ResolutionOutcome::Success(c),
            None => ResolutionOutcome::CoordinatesUndetermined,
        };
        info!(landmark = name, element = %first, outcome = outcome.label(), "landmark resolved");
        Ok(outcome)
    }
}

/// Computed center first, then the element's own lat/lon.
pub fn locate(element: &Element) -> Option<Coordinate> {
    element
        .center_coordinate()
        .or_else(|| element.direct_coordinate())
        .map(Coordinate::from)
}
