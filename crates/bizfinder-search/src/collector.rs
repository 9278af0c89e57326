//! Retrieves named points of interest around a center and turns them into
//! a deduplicated business list.

use std::future::Future;

use bizfinder_core::{Coordinates, NormalizedBusiness, Progress};

use crate::cancel::CancelToken;
use crate::category::{CategoryFilter, CategoryRules};
use crate::dedupe::dedupe_by_name;
use crate::error::SearchError;
use crate::normalize::normalize_poi;
use crate::retry::RetryPolicy;
use crate::types::RawPointOfInterest;

/// A geographic data source that can list named nodes around a point.
///
/// One call is one attempt; [`Collector`] owns the retry policy.
pub trait PoiSource: Send + Sync {
    fn fetch(
        &self,
        center: Coordinates,
        radius_m: f64,
    ) -> impl Future<Output = Result<Vec<RawPointOfInterest>, SearchError>> + Send;
}

pub struct Collector<S> {
    source: S,
    policy: RetryPolicy,
    rules: CategoryRules,
}

impl<S: PoiSource> Collector<S> {
    #[must_use]
    pub fn new(source: S, policy: RetryPolicy, rules: CategoryRules) -> Self {
        Self {
            source,
            policy,
            rules,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Collects businesses within `radius_km` of `center`.
    ///
    /// Records are processed in the order the data source returned them.
    /// `on_progress` is called once per processed record with the running
    /// (processed, total, kept) counts. Records failing `filter` still count
    /// as processed. A malformed record is logged and skipped.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidRequest`] if `radius_km` is not a positive number.
    /// - [`SearchError::DataSource`] once every retrieval attempt has failed;
    ///   no partial list is ever returned.
    /// - [`SearchError::Cancelled`] if `cancel` fires before the list is complete.
    pub async fn collect<F>(
        &self,
        center: Coordinates,
        radius_km: f64,
        filter: CategoryFilter,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<Vec<NormalizedBusiness>, SearchError>
    where
        F: FnMut(Progress),
    {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(SearchError::InvalidRequest(format!(
                "radius must be a positive number of kilometres, got {radius_km}"
            )));
        }
        let radius_m = radius_km * 1000.0;

        let raw = self.retrieve(center, radius_m, cancel).await?;
        let total = raw.len();
        tracing::info!(total, "processing nodes");

        let mut businesses: Vec<NormalizedBusiness> = Vec::with_capacity(total);
        for (index, poi) in raw.iter().enumerate() {
            cancel.check()?;

            if filter.matches(poi) {
                match normalize_poi(poi, &self.rules) {
                    Ok(Some(business)) => {
                        tracing::debug!(
                            name = %business.name,
                            category = %business.category,
                            website_status = business.website_status(),
                            "added business"
                        );
                        businesses.push(business);
                    }
                    Ok(None) => tracing::debug!(node = poi.id, "skipping node without name"),
                    Err(err) => tracing::warn!(error = %err, "skipping malformed node"),
                }
            }

            on_progress(Progress {
                processed: index + 1,
                total,
                kept: businesses.len(),
                status: format!("Processing nodes: {}/{total}", index + 1),
            });
        }

        let kept = businesses.len();
        let unique = dedupe_by_name(businesses);
        tracing::info!(
            kept,
            unique = unique.len(),
            duplicates = kept - unique.len(),
            "collection finished"
        );
        Ok(unique)
    }

    async fn retrieve(
        &self,
        center: Coordinates,
        radius_m: f64,
        cancel: &CancelToken,
    ) -> Result<Vec<RawPointOfInterest>, SearchError> {
        let source = &self.source;
        let max_attempts = self.policy.max_attempts;

        let result = self
            .policy
            .run(cancel, move |attempt| async move {
                tracing::info!(attempt, max_attempts, radius_m, "querying data source");
                tokio::select! {
                    fetched = source.fetch(center, radius_m) => fetched,
                    () = cancel.cancelled() => Err(SearchError::Cancelled),
                }
            })
            .await;

        result.map_err(|failure| match failure.last_error {
            SearchError::Cancelled => SearchError::Cancelled,
            last_error => {
                tracing::error!(
                    attempts = failure.attempts,
                    error = %last_error,
                    "data source failed after all retries"
                );
                SearchError::DataSource {
                    attempts: failure.attempts,
                    reason: last_error.to_string(),
                }
            }
        })
    }
}
