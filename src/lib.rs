//! Geo assistant tools.
//!
//! Answers "hospitals in Gorakhpur" / "cafes near the Eiffel Tower" style
//! requests by resolving a place through the Overpass API (boundary
//! bounding box or landmark coordinate) and then querying amenities inside
//! that scope.

pub mod amenity;
pub mod config;
pub mod location;
pub mod overpass;
pub mod search;
pub mod server;
pub mod tools;

pub use config::Config;
pub use search::{GeoSearch, SearchError};
