//! HTTP client for the Overpass API interpreter endpoint.
//!
//! One call is one attempt; retrying is the collector's job.

use std::time::Duration;

use bizfinder_core::Coordinates;
use reqwest::{Client, Url};

use crate::collector::PoiSource;
use crate::error::SearchError;
use crate::geocode::retry_after_secs;
use crate::types::{OverpassResponse, RawPointOfInterest};

/// Server-side query budget written into the `[timeout:]` setting.
const QUERY_TIMEOUT_SECS: u64 = 25;

/// Builds the Overpass QL query for every named node within `radius_m`
/// metres of `center`.
///
/// The radius is rounded to whole metres (at least 1).
#[must_use]
pub fn build_query(center: Coordinates, radius_m: f64) -> String {
    let radius = radius_m.round().max(1.0);
    format!(
        "[out:json][timeout:{QUERY_TIMEOUT_SECS}];\n(\n  node[\"name\"](around:{radius},{lat},{lon});\n);\nout body;",
        lat = center.latitude,
        lon = center.longitude,
    )
}

/// Client for an Overpass API instance.
pub struct OverpassClient {
    client: Client,
    url: Url,
    timeout_secs: u64,
}

impl OverpassClient {
    /// Creates a client whose every request is bounded by `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidUrl`] if `url` does not parse, or
    /// [`SearchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        let url = Url::parse(url).map_err(|e| SearchError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            url,
            timeout_secs,
        })
    }

    /// Runs one Overpass QL query and returns the node elements it produced.
    ///
    /// Ways, relations and other element types are ignored. A node that does
    /// not decode is logged and skipped.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Timeout`] if the request exceeds the client timeout.
    /// - [`SearchError::RateLimited`] on HTTP 429.
    /// - [`SearchError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`SearchError::Overpass`] when the body carries a runtime-error remark.
    /// - [`SearchError::Deserialize`] if the body is not an Overpass JSON document.
    /// - [`SearchError::Http`] on network failure.
    pub async fn query(&self, query: &str) -> Result<Vec<RawPointOfInterest>, SearchError> {
        tracing::debug!(query, "sending Overpass query");
        let response = self
            .client
            .post(self.url.clone())
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| SearchError::from_transport(e, "Overpass request", self.timeout_secs))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited {
                retry_after_secs: retry_after_secs(&response),
            });
        }
        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::from_transport(e, "Overpass response", self.timeout_secs))?;
        let parsed: OverpassResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: "Overpass response".to_owned(),
                source: e,
            })?;

        if let Some(remark) = parsed.remark.filter(|r| is_error_remark(r)) {
            return Err(SearchError::Overpass { remark });
        }

        Ok(decode_nodes(parsed.elements))
    }
}

impl PoiSource for OverpassClient {
    async fn fetch(
        &self,
        center: Coordinates,
        radius_m: f64,
    ) -> Result<Vec<RawPointOfInterest>, SearchError> {
        self.query(&build_query(center, radius_m)).await
    }
}

fn is_error_remark(remark: &str) -> bool {
    let lowered = remark.to_ascii_lowercase();
    lowered.contains("error") || lowered.contains("timed out")
}

/// Keeps `type == "node"` elements, decoding each independently.
fn decode_nodes(elements: Vec<serde_json::Value>) -> Vec<RawPointOfInterest> {
    let total = elements.len();
    let mut nodes = Vec::with_capacity(total);

    for element in elements {
        if element.get("type").and_then(serde_json::Value::as_str) != Some("node") {
            continue;
        }
        let id = element
            .get("id")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or_default();
        match serde_json::from_value::<RawPointOfInterest>(element) {
            Ok(node) => nodes.push(node),
            Err(e) => {
                let err = SearchError::MalformedRecord {
                    id,
                    reason: e.to_string(),
                };
                tracing::warn!(error = %err, "skipping undecodable Overpass element");
            }
        }
    }

    tracing::info!(
        elements = total,
        nodes = nodes.len(),
        "received Overpass response"
    );
    nodes
}
