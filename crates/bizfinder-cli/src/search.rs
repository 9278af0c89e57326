//! `search` command: runs one search in the background, renders progress on
//! stderr, optionally looks up missing websites, then prints and exports the
//! results.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use bizfinder_core::{AppConfig, NormalizedBusiness};
use bizfinder_search::{
    CancelToken, CategoryFilter, CategoryRules, Collector, Locator, NominatimClient, OverpassClient,
    Region, RetryPolicy, SearchError, SearchPipeline, SearchRequest, SearchService, WebsiteFinder,
};

use crate::{export, map, progress, report};

#[derive(Debug)]
pub(crate) struct SearchArgs {
    pub place: String,
    pub radius_km: Option<f64>,
    pub filter: CategoryFilter,
    pub incomplete_only: bool,
    pub csv: Option<PathBuf>,
    pub map: Option<PathBuf>,
    pub find_websites: bool,
}

/// Wires the configured geocoder, data source and retry policy into a
/// search service.
///
/// # Errors
///
/// Returns an error if a configured service URL cannot be used.
pub(crate) fn build_service(config: &AppConfig) -> anyhow::Result<SearchService<OverpassClient>> {
    let geocoder = NominatimClient::new(
        &config.nominatim_url,
        config.geocode_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build geocoding client")?;
    let locator = Locator::new(
        geocoder,
        Region::new(&config.region_abbrev, &config.region_name),
    );

    let overpass = OverpassClient::new(
        &config.overpass_url,
        config.overpass_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build Overpass client")?;
    let policy = RetryPolicy::new(
        config.overpass_max_attempts,
        Duration::from_secs(config.overpass_backoff_base_secs),
        config.overpass_backoff_multiplier,
    );
    let collector = Collector::new(
        overpass,
        policy,
        CategoryRules::new(config.category_tags.iter().cloned()),
    );

    Ok(SearchService::new(SearchPipeline::new(locator, collector)))
}

/// Builds the web-search client for the optional website lookup.
///
/// # Errors
///
/// Returns an error if the configured search URL cannot be used.
pub(crate) fn build_website_finder(config: &AppConfig) -> anyhow::Result<WebsiteFinder> {
    let finder = WebsiteFinder::new(
        &config.website_search_url,
        config.website_search_timeout_secs,
        &config.website_search_user_agent,
    )
    .context("failed to build website search client")?;
    Ok(finder.with_delay(Duration::from_millis(config.website_search_delay_ms)))
}

/// Looks up websites for the businesses that have none and reports how many
/// were found. Cancelling keeps whatever was found so far.
async fn find_missing_websites(
    finder: &WebsiteFinder,
    businesses: &mut [NormalizedBusiness],
    cancel: &CancelToken,
) {
    let missing = businesses.iter().filter(|b| !b.has_website()).count();
    if missing == 0 {
        return;
    }

    let bar = progress::start("websites");
    let result = finder
        .fill_missing(businesses, cancel, |event| progress::apply(&bar, &event))
        .await;
    bar.finish_and_clear();

    match result {
        Ok(found) => println!("Found websites for {found} out of {missing} businesses."),
        Err(err) => {
            tracing::warn!(error = %err, "website lookup stopped");
            println!("Website lookup cancelled; showing results found so far.");
        }
    }
}

/// Runs a search and presents the outcome.
///
/// Ctrl-C cancels the search; it then ends with a "Search cancelled" error.
/// During the website lookup it only stops the lookup, and the results found
/// so far are still shown.
///
/// # Errors
///
/// Returns a single user-facing message when the search fails, or an error if
/// an export file cannot be written.
pub(crate) async fn run_search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let request = SearchRequest {
        place: args.place.clone(),
        radius_km: args.radius_km.unwrap_or(config.default_radius_km),
        filter: args.filter,
    };
    request
        .validate()
        .map_err(|err| anyhow::anyhow!(user_message(&err)))?;

    let service = build_service(config)?;
    let finder = if args.find_websites {
        Some(build_website_finder(config)?)
    } else {
        None
    };
    let mut handle = service
        .start(request.clone())
        .map_err(|err| anyhow::anyhow!(user_message(&err)))?;

    let search_cancel = handle.cancel_token();
    let website_cancel = CancelToken::new();
    let interrupt = {
        let website_cancel = website_cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling search");
                search_cancel.cancel();
                website_cancel.cancel();
            }
        })
    };

    let bar = progress::start("search");
    while let Some(event) = handle.next_progress().await {
        progress::apply(&bar, &event);
    }
    bar.finish_and_clear();

    let result = handle.finish().await;
    let mut outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            interrupt.abort();
            return Err(anyhow::anyhow!(user_message(&err)));
        }
    };

    if let Some(finder) = &finder {
        find_missing_websites(finder, &mut outcome.businesses, &website_cancel).await;
    }
    interrupt.abort();

    if outcome.businesses.is_empty() {
        println!("{}", report::no_results_message(&request));
        return Ok(());
    }

    let rows = report::visible_rows(&outcome.businesses, args.incomplete_only);
    report::print_table(outcome.center, &rows);
    println!();
    println!("{}", report::summary(&outcome));
    if args.incomplete_only {
        println!(
            "Showing {} of {} businesses with incomplete data.",
            rows.len(),
            outcome.businesses.len()
        );
    }

    if let Some(path) = &args.csv {
        export::write_csv_file(path, &rows)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "exported csv");
        println!("Exported {} rows to {}", rows.len(), path.display());
    }
    if let Some(path) = &args.map {
        map::write_map_file(path, outcome.center, &rows)?;
        tracing::info!(path = %path.display(), markers = rows.len(), "wrote map");
        println!("Map saved to {}", path.display());
    }

    Ok(())
}

/// One categorized message per failure kind.
pub(crate) fn user_message(err: &SearchError) -> String {
    match err {
        SearchError::InvalidRequest(reason) => format!("Invalid search: {reason}"),
        SearchError::LocationNotFound { query } => format!("Could not find location: {query}"),
        SearchError::LocationService { query, reason } => {
            format!("Error finding location {query}: {reason}")
        }
        SearchError::DataSource { attempts, reason } => {
            format!("Failed to get business data after {attempts} attempts: {reason}")
        }
        SearchError::SearchInProgress => "A search is already in progress".to_owned(),
        SearchError::Cancelled => "Search cancelled".to_owned(),
        other => format!("Search failed: {other}"),
    }
}
