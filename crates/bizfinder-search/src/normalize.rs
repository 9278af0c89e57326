//! Normalization from raw Overpass nodes to [`bizfinder_core::NormalizedBusiness`].

use bizfinder_core::NormalizedBusiness;

use crate::category::CategoryRules;
use crate::error::SearchError;
use crate::types::RawPointOfInterest;

/// Builds the display address from `addr:street` and `addr:housenumber`.
///
/// Both parts default to empty and are joined with one space. The result is
/// not trimmed; it is empty only when both tags are absent.
#[must_use]
pub fn format_address(poi: &RawPointOfInterest) -> String {
    let street = poi.tags.get("addr:street");
    let housenumber = poi.tags.get("addr:housenumber");
    if street.is_none() && housenumber.is_none() {
        return String::new();
    }
    format!(
        "{} {}",
        street.map_or("", String::as_str),
        housenumber.map_or("", String::as_str)
    )
}

/// Normalizes one raw node.
///
/// Returns `Ok(None)` when the node has no usable name; such nodes are not
/// businesses and are dropped silently.
///
/// # Errors
///
/// Returns [`SearchError::MalformedRecord`] if the node is named but lacks
/// finite coordinates.
pub fn normalize_poi(
    poi: &RawPointOfInterest,
    rules: &CategoryRules,
) -> Result<Option<NormalizedBusiness>, SearchError> {
    let Some(name) = poi.tag("name").filter(|n| !n.trim().is_empty()) else {
        return Ok(None);
    };

    let (latitude, longitude) = match (poi.lat, poi.lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
        _ => {
            return Err(SearchError::MalformedRecord {
                id: poi.id,
                reason: format!("node {name:?} has no usable coordinates"),
            });
        }
    };

    Ok(Some(NormalizedBusiness {
        name: name.to_owned(),
        address: format_address(poi),
        category: rules.classify(poi),
        website: poi.tag("website").map(str::to_owned),
        latitude,
        longitude,
        incomplete: false,
    }))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
