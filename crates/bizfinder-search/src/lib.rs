//! Place search pipeline: geocode a place, pull named points of interest
//! around it from Overpass, and normalize them into business records.

pub mod cancel;
pub mod category;
pub mod collector;
pub mod dedupe;
pub mod error;
pub mod geocode;
pub mod locator;
pub mod normalize;
pub mod overpass;
pub mod pipeline;
pub mod retry;
pub mod types;
pub mod website;

pub use cancel::CancelToken;
pub use category::{CategoryFilter, CategoryRules};
pub use collector::{Collector, PoiSource};
pub use dedupe::dedupe_by_name;
pub use error::SearchError;
pub use geocode::NominatimClient;
pub use locator::{candidate_queries, Locator, Region};
pub use normalize::{format_address, normalize_poi};
pub use overpass::{build_query, OverpassClient};
pub use pipeline::{SearchHandle, SearchPipeline, SearchRequest, SearchService};
pub use retry::RetryPolicy;
pub use types::RawPointOfInterest;
pub use website::{extract_result_links, pick_website, search_query, WebsiteFinder};
