use std::collections::HashSet;

use bizfinder_core::NormalizedBusiness;

/// Keeps the first record for each distinct `name`, preserving input order.
///
/// Names are compared exactly. Later records with a seen name are dropped
/// even if their other fields differ.
#[must_use]
pub fn dedupe_by_name(businesses: Vec<NormalizedBusiness>) -> Vec<NormalizedBusiness> {
    let mut seen: HashSet<String> = HashSet::with_capacity(businesses.len());
    businesses
        .into_iter()
        .filter(|b| seen.insert(b.name.clone()))
        .collect()
}
