//! Place resolution for the amenity search pipeline.
//!
//! Two resolvers share one Overpass transport:
//! - [`RegionResolver`]: administrative boundary -> bounding box, with
//!   admin-level fallback and ambiguity detection.
//! - [`PointResolver`]: named landmark -> single coordinate.

pub mod point;
pub mod region;
pub mod types;

pub use point::PointResolver;
pub use region::{RegionResolver, DEFAULT_ADMIN_LEVELS};
pub use types::{BoundingBox, Coordinate, PlaceQuery, ResolutionOutcome, SpatialScope};
