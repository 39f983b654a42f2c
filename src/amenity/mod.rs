//! Amenity querying and result normalization.

pub mod engine;
pub mod normalize;

pub use engine::AmenityQueryEngine;
pub use normalize::{normalize, NormalizedResult};

use std::fmt;

/// Optional `amenity=*` category. `None` matches any feature that carries
/// an amenity tag at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmenityFilter(Option<String>);

impl AmenityFilter {
    pub fn any() -> Self {
        Self(None)
    }

    pub fn exact(category: impl Into<String>) -> Self {
        Self::from_option(Some(category.into()))
    }

    /// Blank categories collapse to [`AmenityFilter::any`].
    pub fn from_option(category: Option<String>) -> Self {
        Self(category.filter(|c| !c.trim().is_empty()))
    }

    pub fn category(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Value reported back as `amenity_type_searched`.
    pub fn label(&self) -> &str {
        self.0.as_deref().unwrap_or("all")
    }
}

impl fmt::Display for AmenityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_any() {
        assert_eq!(AmenityFilter::from_option(Some("  ".into())), AmenityFilter::any());
        assert_eq!(AmenityFilter::from_option(None).category(), None);
        assert_eq!(AmenityFilter::exact("").label(), "all");
    }

    #[test]
    fn test_exact_keeps_case() {
        let f = AmenityFilter::exact("Cafe");
        assert_eq!(f.category(), Some("Cafe"));
        assert_eq!(f.to_string(), "Cafe");
    }
}
