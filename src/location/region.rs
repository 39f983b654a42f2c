//! Region resolver: place name -> administrative boundary bounding box.
//!
//! Admin levels are tried in order (city/district first, then broader).
//! The first level with any match decides the outcome; matches are never
//! merged across levels.

use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use super::types::{BoundingBox, PlaceQuery, ResolutionOutcome};
use crate::config::SearchConfig;
use crate::overpass::{Element, OverpassError, OverpassQuery, Transport};

/// Admin levels tried when no configuration says otherwise.
pub const DEFAULT_ADMIN_LEVELS: &[u8] = &[8, 7, 6, 5];

pub struct RegionResolver<'a, T: Transport> {
    transport: &'a T,
    admin_levels: Vec<u8>,
    timeout_secs: u64,
    delay: Duration,
}

impl<'a, T: Transport> RegionResolver<'a, T> {
    pub fn new(transport: &'a T, config: &SearchConfig) -> Self {
        Self {
            transport,
            admin_levels: config.admin_levels.clone(),
            timeout_secs: config.boundary_timeout_secs,
            delay: Duration::from_millis(config.courtesy_delay_ms),
        }
    }

    /// Resolve `name` using the configured admin levels.
    pub fn resolve(&self, name: &str) -> Result<ResolutionOutcome<BoundingBox>, OverpassError> {
        self.resolve_query(&PlaceQuery::new(name, &self.admin_levels))
    }

    pub fn resolve_query(&self, query: &PlaceQuery) -> Result<ResolutionOutcome<BoundingBox>, OverpassError> {
        for (i, &level) in query.admin_levels.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }

            let request = OverpassQuery::boundary_relation(&query.name, level, self.timeout_secs);
            let elements = self.transport.execute(&request)?.elements;
            debug!(name = %query.name, level, matches = elements.len(), "boundary lookup");

            if let Some(outcome) = classify_level(&query.name, &elements)? {
                info!(name = %query.name, level, outcome = outcome.label(), "region resolved");
                return Ok(outcome);
            }
        }

        info!(name = %query.name, levels = ?query.admin_levels, "region not found at any admin level");
        Ok(ResolutionOutcome::NotFound)
    }
}

/// `None` when the level had no match and the next level should be tried.
fn classify_level(
    query_name: &str,
    elements: &[Element],
) -> Result<Option<ResolutionOutcome<BoundingBox>>, OverpassError> {
    match elements {
        [] => Ok(None),
        [single] => {
            let bounds = single.bounds.ok_or_else(|| {
                OverpassError::InvalidResponse(format!("{} has no bounds", single))
            })?;
            Ok(Some(ResolutionOutcome::Success(bounds.into())))
        }
        many => {
            let names: BTreeSet<String> = many
                .iter()
                .map(|el| el.name().unwrap_or(query_name).to_string())
                .collect();
            Ok(Some(ResolutionOutcome::Ambiguous(names)))
        }
    }
}
