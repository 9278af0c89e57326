//! Optional website lookup for businesses whose map data carries no URL.
//!
//! Queries an HTML web-search endpoint (DuckDuckGo's `html/` page by default)
//! and picks a plausible official site from the top result links.

use std::sync::LazyLock;
use std::time::Duration;

use bizfinder_core::{NormalizedBusiness, Progress};
use regex::Regex;
use reqwest::{Client, Url};

use crate::cancel::CancelToken;
use crate::error::SearchError;
use crate::geocode::retry_after_secs;

/// Only the first few result links are considered.
const MAX_RESULTS: usize = 5;

/// Hosts that never count as a business's own website.
const SKIP_DOMAINS: &[&str] = &[
    "google.com",
    "bing.com",
    "yahoo.com",
    "youtube.com",
    "facebook.com",
    "wikipedia.org",
    "yelp.com",
    "duckduckgo.com",
];

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>").expect("valid regex"));
static RESULT_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*["'][^"']*\bresult__url\b[^"']*["']"#).expect("valid regex")
});
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bhref\s*=\s*["']([^"']*)["']"#).expect("valid regex"));

/// Free-text query sent for one business.
#[must_use]
pub fn search_query(name: &str, address: &str) -> String {
    let address = address.trim();
    if address.is_empty() {
        format!("{} official website", name.trim())
    } else {
        format!("{} {address} official website", name.trim())
    }
}

/// Returns the `href` of every result link on a search results page, in
/// page order, with `&amp;` decoded.
#[must_use]
pub fn extract_result_links(html: &str) -> Vec<String> {
    ANCHOR_RE
        .find_iter(html)
        .map(|tag| tag.as_str())
        .filter(|tag| RESULT_CLASS_RE.is_match(tag))
        .filter_map(|tag| {
            HREF_RE
                .captures(tag)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().replace("&amp;", "&"))
        })
        .filter(|href| !href.trim().is_empty())
        .collect()
}

/// Picks the most plausible website among the top result links.
///
/// Search-engine, social and directory hosts are skipped. A host containing
/// the business name (letters and digits only, case-insensitive) wins and is
/// reduced to scheme, host and path; otherwise the first remaining link is
/// returned as-is.
#[must_use]
pub fn pick_website(business_name: &str, links: &[String]) -> Option<String> {
    let needle = name_key(business_name);
    let mut fallback = None;

    for link in links.iter().take(MAX_RESULTS) {
        let Some(url) = resolve_link(link) else {
            continue;
        };
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            continue;
        };
        if SKIP_DOMAINS.iter().any(|skip| host.contains(skip)) {
            continue;
        }
        if !needle.is_empty() && name_key(&host).contains(&needle) {
            return Some(format!("{}://{host}{}", url.scheme(), url.path()));
        }
        if fallback.is_none() {
            fallback = Some(url.to_string());
        }
    }

    fallback
}

/// Turns a result `href` into an absolute http(s) URL, unwrapping the
/// search engine's `/l/?uddg=` redirect links.
fn resolve_link(href: &str) -> Option<Url> {
    let href = href.trim();
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else if href.contains("://") {
        href.to_owned()
    } else {
        format!("https://{href}")
    };

    let url = Url::parse(&absolute).ok()?;
    let redirect_target = url
        .host_str()
        .filter(|host| host.ends_with("duckduckgo.com"))
        .and_then(|_| url.query_pairs().find(|(k, _)| k == "uddg"))
        .map(|(_, target)| target.into_owned());
    let url = match redirect_target {
        Some(target) => Url::parse(&target).ok()?,
        None => url,
    };

    matches!(url.scheme(), "http" | "https").then_some(url)
}

fn name_key(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Web-search client that looks up one business website per request.
pub struct WebsiteFinder {
    client: Client,
    search_url: Url,
    timeout_secs: u64,
    delay: Duration,
}

impl WebsiteFinder {
    /// Creates a finder that pauses one second between lookups.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidUrl`] if `search_url` does not parse, or
    /// [`SearchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(search_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        let parsed = Url::parse(search_url).map_err(|e| SearchError::InvalidUrl {
            url: search_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            search_url: parsed,
            timeout_secs,
            delay: Duration::from_secs(1),
        })
    }

    /// Sets the pause between consecutive lookups in a batch.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Searches for the website of one business.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Timeout`] if the request exceeds the client timeout.
    /// - [`SearchError::RateLimited`] on HTTP 429.
    /// - [`SearchError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`SearchError::Http`] on network failure.
    pub async fn find(&self, name: &str, address: &str) -> Result<Option<String>, SearchError> {
        let query = search_query(name, address);
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("q", query.as_str())])
            .send()
            .await
            .map_err(|e| SearchError::from_transport(e, "website search", self.timeout_secs))?;

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

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::from_transport(e, "website search", self.timeout_secs))?;
        let links = extract_result_links(&html);
        tracing::debug!(name, links = links.len(), "website search results");
        Ok(pick_website(name, &links))
    }

    /// Looks up a website for every business that has none, updating the
    /// records in place, and returns how many were found.
    ///
    /// Lookups run one at a time with the configured delay in between. A
    /// failed lookup is logged and leaves the record unchanged; a rate-limit
    /// response ends the batch early. `on_progress` is called after each
    /// lookup with `kept` set to the number found so far.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] if `cancel` fires. Websites found
    /// before that point stay on their records.
    pub async fn fill_missing<F>(
        &self,
        businesses: &mut [NormalizedBusiness],
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<usize, SearchError>
    where
        F: FnMut(Progress),
    {
        let missing: Vec<usize> = businesses
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.has_website())
            .map(|(i, _)| i)
            .collect();
        let total = missing.len();
        tracing::info!(total, "starting website lookup");

        let mut found = 0usize;
        for (n, &index) in missing.iter().enumerate() {
            cancel.check()?;
            if n > 0 && !self.delay.is_zero() {
                tokio::select! {
                    () = tokio::time::sleep(self.delay) => {}
                    () = cancel.cancelled() => return Err(SearchError::Cancelled),
                }
            }

            let business = &mut businesses[index];
            let lookup = tokio::select! {
                result = self.find(&business.name, &business.address) => result,
                () = cancel.cancelled() => return Err(SearchError::Cancelled),
            };

            match lookup {
                Ok(Some(url)) => {
                    tracing::info!(name = %business.name, website = %url, "found website");
                    business.website = Some(url);
                    business.incomplete = false;
                    found += 1;
                }
                Ok(None) => tracing::debug!(name = %business.name, "no website found"),
                Err(err @ SearchError::RateLimited { .. }) => {
                    tracing::warn!(error = %err, "website search rate limited, stopping lookup");
                    break;
                }
                Err(err) => {
                    tracing::warn!(name = %business.name, error = %err, "website lookup failed");
                }
            }

            on_progress(Progress {
                processed: n + 1,
                total,
                kept: found,
                status: format!("Searching for websites: {}/{total}", n + 1),
            });
        }

        tracing::info!(found, total, "website lookup finished");
        Ok(found)
    }
}

#[cfg(test)]
#[path = "website_test.rs"]
mod tests;
