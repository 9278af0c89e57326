//! Resolves free-text place descriptions to coordinates.
//!
//! Unqualified place names ("Denver") are ambiguous across a country, so
//! they are first tried with the configured region abbreviation appended and
//! then with the full region name. Text that already carries a comma is
//! treated as qualified and sent verbatim.

use bizfinder_core::Coordinates;

use crate::error::SearchError;
use crate::geocode::NominatimClient;

/// Regional qualifier appended to unqualified place names.
///
/// Either part may be empty to skip that attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub abbreviation: String,
    pub name: String,
}

impl Region {
    #[must_use]
    pub fn new(abbreviation: &str, name: &str) -> Self {
        Self {
            abbreviation: abbreviation.trim().to_owned(),
            name: name.trim().to_owned(),
        }
    }
}

/// Returns the geocoder queries to try for `place`, in order.
///
/// A place containing a comma yields itself only. Otherwise each non-empty
/// region suffix yields `"<place>, <suffix>"`; with no usable suffix the bare
/// place is used.
#[must_use]
pub fn candidate_queries(place: &str, region: &Region) -> Vec<String> {
    let place = place.trim();
    if place.contains(',') {
        return vec![place.to_owned()];
    }

    let mut queries: Vec<String> = Vec::with_capacity(2);
    for suffix in [region.abbreviation.as_str(), region.name.as_str()] {
        if suffix.is_empty() {
            continue;
        }
        let query = format!("{place}, {suffix}");
        if !queries.contains(&query) {
            queries.push(query);
        }
    }

    if queries.is_empty() {
        queries.push(place.to_owned());
    }
    queries
}

/// Place-name resolver. Holds no state between calls.
pub struct Locator {
    geocoder: NominatimClient,
    region: Region,
}

impl Locator {
    #[must_use]
    pub fn new(geocoder: NominatimClient, region: Region) -> Self {
        Self { geocoder, region }
    }

    /// Resolves `place` to coordinates.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidRequest`] if `place` is blank.
    /// - [`SearchError::LocationService`] if any attempt fails at the network
    ///   or protocol level (including timeouts); later candidates are not tried.
    /// - [`SearchError::LocationNotFound`] if every candidate returns no match.
    pub async fn resolve(&self, place: &str) -> Result<Coordinates, SearchError> {
        if place.trim().is_empty() {
            return Err(SearchError::InvalidRequest(
                "please enter a location".to_owned(),
            ));
        }

        tracing::info!(place, "starting location lookup");
        for query in candidate_queries(place, &self.region) {
            match self.geocoder.search(&query).await {
                Ok(Some(coordinates)) => {
                    tracing::info!(
                        place,
                        query,
                        latitude = coordinates.latitude,
                        longitude = coordinates.longitude,
                        "found coordinates"
                    );
                    return Ok(coordinates);
                }
                Ok(None) => {
                    tracing::debug!(place, query, "no geocoder match for candidate");
                }
                Err(err) => {
                    tracing::error!(place, query, error = %err, "error getting coordinates");
                    return Err(SearchError::LocationService {
                        query: place.trim().to_owned(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::error!(place, "failed to find coordinates");
        Err(SearchError::LocationNotFound {
            query: place.trim().to_owned(),
        })
    }
}
