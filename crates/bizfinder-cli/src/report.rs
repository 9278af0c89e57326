use bizfinder_core::{Coordinates, NormalizedBusiness, SearchOutcome};
use bizfinder_search::SearchRequest;

const NAME_WIDTH: usize = 32;
const ADDRESS_WIDTH: usize = 28;
const CATEGORY_WIDTH: usize = 16;

/// Rows shown to the user. With `incomplete_only`, complete rows are hidden.
pub(crate) fn visible_rows(
    businesses: &[NormalizedBusiness],
    incomplete_only: bool,
) -> Vec<&NormalizedBusiness> {
    businesses
        .iter()
        .filter(|b| !incomplete_only || !b.is_complete())
        .collect()
}

pub(crate) fn summary(outcome: &SearchOutcome) -> String {
    format!(
        "Found {} businesses. {} businesses without websites.",
        outcome.businesses.len(),
        outcome.without_website_count()
    )
}

pub(crate) fn no_results_message(request: &SearchRequest) -> String {
    format!(
        "No businesses found in this area.\n\n\
         Searched for: {}\n\
         Location: {}\n\
         Radius: {} km\n\n\
         Try increasing the search radius or changing the location.",
        request.filter,
        request.place.trim(),
        request.radius_km
    )
}

pub(crate) fn print_table(center: Coordinates, rows: &[&NormalizedBusiness]) {
    println!(
        "{:<NAME_WIDTH$}  {:<ADDRESS_WIDTH$}  {:<CATEGORY_WIDTH$}  {:<14}  {:<11}  {:>8}  WEBSITE",
        "NAME", "ADDRESS", "CATEGORY", "WEBSITE STATUS", "DATA STATUS", "DIST KM"
    );
    for business in rows {
        println!("{}", format_row(center, business));
    }
}

fn format_row(center: Coordinates, business: &NormalizedBusiness) -> String {
    let distance = center.distance_km(&business.coordinates());
    format!(
        "{:<NAME_WIDTH$}  {:<ADDRESS_WIDTH$}  {:<CATEGORY_WIDTH$}  {:<14}  {:<11}  {:>8.2}  {}",
        truncate(&business.name, NAME_WIDTH),
        truncate(&business.address, ADDRESS_WIDTH),
        truncate(&business.category, CATEGORY_WIDTH),
        business.website_status(),
        business.data_status(),
        distance,
        business.website.as_deref().unwrap_or("-"),
    )
}

/// Shortens `text` to at most `width` characters, marking the cut with "...".
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_owned()
    }
}
