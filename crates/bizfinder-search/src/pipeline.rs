//! Search orchestration: Locator, then Collector, run off the caller's task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bizfinder_core::{Progress, SearchOutcome};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::cancel::CancelToken;
use crate::category::CategoryFilter;
use crate::collector::{Collector, PoiSource};
use crate::error::SearchError;
use crate::locator::Locator;

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub place: String,
    pub radius_km: f64,
    pub filter: CategoryFilter,
}

impl SearchRequest {
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidRequest`] for a blank place or a radius
    /// that is not a positive number.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.place.trim().is_empty() {
            return Err(SearchError::InvalidRequest(
                "please enter a location".to_owned(),
            ));
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(SearchError::InvalidRequest(format!(
                "please enter a valid radius, got {}",
                self.radius_km
            )));
        }
        Ok(())
    }
}

pub struct SearchPipeline<S> {
    locator: Locator,
    collector: Collector<S>,
}

impl<S: PoiSource> SearchPipeline<S> {
    #[must_use]
    pub fn new(locator: Locator, collector: Collector<S>) -> Self {
        Self { locator, collector }
    }

    /// Runs one search to completion on the current task.
    ///
    /// A Locator failure aborts before the data source is contacted.
    ///
    /// # Errors
    ///
    /// Any [`SearchError`] from validation, the Locator or the Collector.
    pub async fn run<F>(
        &self,
        request: &SearchRequest,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<SearchOutcome, SearchError>
    where
        F: FnMut(Progress),
    {
        request.validate()?;
        cancel.check()?;

        on_progress(Progress::status(format!("Locating {}", request.place.trim())));
        let center = tokio::select! {
            resolved = self.locator.resolve(&request.place) => resolved?,
            () = cancel.cancelled() => return Err(SearchError::Cancelled),
        };

        on_progress(Progress::status(format!(
            "Searching {} within {} km of {center}",
            request.filter, request.radius_km
        )));
        let businesses = self
            .collector
            .collect(
                center,
                request.radius_km,
                request.filter,
                cancel,
                &mut on_progress,
            )
            .await?;

        Ok(SearchOutcome { center, businesses })
    }
}

/// Runs searches in the background, one at a time.
pub struct SearchService<S> {
    pipeline: Arc<SearchPipeline<S>>,
    busy: Arc<AtomicBool>,
}

impl<S: PoiSource + 'static> SearchService<S> {
    #[must_use]
    pub fn new(pipeline: SearchPipeline<S>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Spawns a search on the tokio runtime and returns a handle to its
    /// progress stream and terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SearchInProgress`] while an earlier search is
    /// still running.
    pub fn start(&self, request: SearchRequest) -> Result<SearchHandle, SearchError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(place = %request.place, "rejecting search, another is in progress");
            return Err(SearchError::SearchInProgress);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancelToken::new();
        let task_cancel = cancel.clone();
        let pipeline = Arc::clone(&self.pipeline);
        let span = tracing::info_span!(
            "search",
            place = %request.place,
            radius_km = request.radius_km,
            filter = %request.filter,
        );

        let task = tokio::spawn(
            async move {
                let _guard = guard;
                let result = pipeline
                    .run(&request, &task_cancel, |progress| {
                        // Fire-and-forget: a dropped receiver must not stop the search.
                        let _ = tx.send(progress);
                    })
                    .await;
                match &result {
                    Ok(outcome) => tracing::info!(
                        businesses = outcome.businesses.len(),
                        without_website = outcome.without_website_count(),
                        "search finished"
                    ),
                    Err(err) => tracing::error!(error = %err, "search failed"),
                }
                result
            }
            .instrument(span),
        );

        Ok(SearchHandle {
            progress: rx,
            cancel,
            task,
        })
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Caller's side of a running search.
pub struct SearchHandle {
    progress: mpsc::UnboundedReceiver<Progress>,
    cancel: CancelToken,
    task: JoinHandle<Result<SearchOutcome, SearchError>>,
}

impl SearchHandle {
    /// Next progress event, or `None` once the search has ended and every
    /// event has been drained.
    pub async fn next_progress(&mut self) -> Option<Progress> {
        self.progress.recv().await
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the terminal outcome.
    ///
    /// # Errors
    ///
    /// The search's own [`SearchError`], or [`SearchError::TaskFailed`] if the
    /// task panicked or was aborted.
    pub async fn finish(self) -> Result<SearchOutcome, SearchError> {
        self.task
            .await
            .map_err(|e| SearchError::TaskFailed(e.to_string()))?
    }
}
