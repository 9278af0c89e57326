//! Tag-driven classification and filtering of points of interest.

use crate::types::RawPointOfInterest;

/// Category assigned when no rule matches.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Default priority order of category tag keys.
pub const DEFAULT_CATEGORY_TAGS: [&str; 5] = ["amenity", "shop", "office", "leisure", "tourism"];

/// `amenity` values that count as restaurants for [`CategoryFilter::Restaurants`].
const FOOD_AMENITIES: [&str; 8] = [
    "restaurant",
    "cafe",
    "fast_food",
    "bar",
    "pub",
    "food_court",
    "ice_cream",
    "biergarten",
];

/// Ordered list of tag keys evaluated first-match-wins.
///
/// A record tagged with more than one listed key is classified by the
/// earliest key only; values are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRules {
    keys: Vec<String>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_TAGS)
    }
}

impl CategoryRules {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the value of the first rule key present on `poi`, or
    /// [`UNKNOWN_CATEGORY`].
    #[must_use]
    pub fn classify(&self, poi: &RawPointOfInterest) -> String {
        self.keys
            .iter()
            .find_map(|key| poi.tag(key))
            .unwrap_or(UNKNOWN_CATEGORY)
            .to_owned()
    }
}

/// Caller-selected business type, applied to raw tags before normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Restaurants,
    Shops,
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(self, poi: &RawPointOfInterest) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Restaurants => poi
                .tag("amenity")
                .is_some_and(|value| FOOD_AMENITIES.contains(&value)),
            CategoryFilter::Shops => poi.tag("shop").is_some(),
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all amenities"),
            CategoryFilter::Restaurants => write!(f, "restaurants"),
            CategoryFilter::Shops => write!(f, "shops"),
        }
    }
}
