use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{what} timed out after {secs}s")]
    Timeout { what: String, secs: u64 },

    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Overpass answered 200 but reported a runtime error in `remark`.
    #[error("Overpass runtime error: {remark}")]
    Overpass { remark: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    #[error("could not find coordinates for: {query}")]
    LocationNotFound { query: String },

    #[error("error getting location coordinates for {query}: {reason}")]
    LocationService { query: String, reason: String },

    #[error("failed to get business data after {attempts} attempts: {reason}")]
    DataSource { attempts: u32, reason: String },

    #[error("malformed record {id}: {reason}")]
    MalformedRecord { id: u64, reason: String },

    #[error("a search is already in progress")]
    SearchInProgress,

    #[error("search cancelled")]
    Cancelled,

    #[error("search task failed: {0}")]
    TaskFailed(String),
}

impl SearchError {
    /// Maps a transport error into the request-scoped variant, turning
    /// `reqwest` timeouts into [`SearchError::Timeout`].
    pub(crate) fn from_transport(err: reqwest::Error, what: &str, secs: u64) -> Self {
        if err.is_timeout() {
            SearchError::Timeout {
                what: what.to_owned(),
                secs,
            }
        } else {
            SearchError::Http(err)
        }
    }
}
