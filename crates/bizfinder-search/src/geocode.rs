//! HTTP client for the Nominatim `/search` endpoint.

use std::time::Duration;

use bizfinder_core::Coordinates;
use reqwest::{Client, Url};

use crate::error::SearchError;
use crate::types::NominatimPlace;

/// Free-text geocoder backed by a Nominatim instance.
///
/// Every request is bounded by `timeout_secs`; a timeout surfaces as
/// [`SearchError::Timeout`] rather than as "no match".
pub struct NominatimClient {
    client: Client,
    search_url: Url,
    timeout_secs: u64,
}

impl NominatimClient {
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidUrl`] if `base_url` does not parse, or
    /// [`SearchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // Trailing slash so `join` appends rather than replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|base| base.join("search"))
            .map_err(|e| SearchError::InvalidUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            search_url,
            timeout_secs,
        })
    }

    /// Looks up `query` and returns the best match, or `None` when the service
    /// knows no such place.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Timeout`] if the request exceeds the configured timeout.
    /// - [`SearchError::RateLimited`] on HTTP 429.
    /// - [`SearchError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`SearchError::Http`] on network failure.
    /// - [`SearchError::Deserialize`] if the body is not a Nominatim result list.
    pub async fn search(&self, query: &str) -> Result<Option<Coordinates>, SearchError> {
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| SearchError::from_transport(e, "geocode request", self.timeout_secs))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited {
                retry_after_secs: retry_after_secs(&response),
            });
        }
        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.search_url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::from_transport(e, "geocode response", self.timeout_secs))?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: format!("geocode results for {query:?}"),
                source: e,
            })?;

        Ok(places.into_iter().next().map(|place| {
            tracing::debug!(
                query,
                display_name = place.display_name.as_deref().unwrap_or(""),
                "geocoder match"
            );
            Coordinates::new(place.lat, place.lon)
        }))
    }
}

/// Reads `Retry-After` as whole seconds, defaulting to 60.
pub(crate) fn retry_after_secs(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(60)
}
