use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_CATEGORY_TAGS: &str = "amenity,shop,office,leisure,tourism";

/// The HTML search endpoint serves a reduced page to non-browser agents.
const DEFAULT_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed
/// or falls outside its valid range.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config pointed at the public Nominatim and Overpass instances.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let log_level = or_default("BIZFINDER_LOG_LEVEL", "info");
    let log_file = PathBuf::from(or_default("BIZFINDER_LOG_FILE", "business_finder.log"));
    let user_agent = or_default("BIZFINDER_USER_AGENT", "business_finder/0.1");
    let nominatim_url = or_default(
        "BIZFINDER_NOMINATIM_URL",
        "https://nominatim.openstreetmap.org",
    );
    let overpass_url = or_default(
        "BIZFINDER_OVERPASS_URL",
        "https://overpass-api.de/api/interpreter",
    );
    let region_abbrev = or_default("BIZFINDER_REGION_ABBREV", "CO").trim().to_string();
    let region_name = or_default("BIZFINDER_REGION_NAME", "Colorado")
        .trim()
        .to_string();

    // A zero reqwest timeout fails every request immediately.
    let parse_timeout = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let secs = parse_u64(var, default)?;
        if secs == 0 {
            return Err(invalid(var, "must be at least 1 second".to_string()));
        }
        Ok(secs)
    };

    let geocode_timeout_secs = parse_timeout("BIZFINDER_GEOCODE_TIMEOUT_SECS", "10")?;
    let overpass_timeout_secs = parse_timeout("BIZFINDER_OVERPASS_TIMEOUT_SECS", "60")?;

    let overpass_max_attempts = parse_u32("BIZFINDER_OVERPASS_MAX_ATTEMPTS", "3")?;
    if overpass_max_attempts == 0 {
        return Err(invalid(
            "BIZFINDER_OVERPASS_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }

    let overpass_backoff_base_secs = parse_u64("BIZFINDER_OVERPASS_BACKOFF_BASE_SECS", "5")?;
    let overpass_backoff_multiplier = parse_u32("BIZFINDER_OVERPASS_BACKOFF_MULTIPLIER", "2")?;
    if overpass_backoff_multiplier == 0 {
        return Err(invalid(
            "BIZFINDER_OVERPASS_BACKOFF_MULTIPLIER",
            "must be at least 1".to_string(),
        ));
    }

    let category_tags = parse_category_tags(&or_default(
        "BIZFINDER_CATEGORY_TAGS",
        DEFAULT_CATEGORY_TAGS,
    ));
    if category_tags.is_empty() {
        return Err(invalid(
            "BIZFINDER_CATEGORY_TAGS",
            "must name at least one tag key".to_string(),
        ));
    }

    let raw_radius = or_default("BIZFINDER_DEFAULT_RADIUS_KM", "5");
    let default_radius_km = raw_radius
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid("BIZFINDER_DEFAULT_RADIUS_KM", e.to_string()))?;
    if !default_radius_km.is_finite() || default_radius_km <= 0.0 {
        return Err(invalid(
            "BIZFINDER_DEFAULT_RADIUS_KM",
            format!("must be a positive number, got {raw_radius}"),
        ));
    }

    let website_search_url = or_default(
        "BIZFINDER_WEBSITE_SEARCH_URL",
        "https://html.duckduckgo.com/html/",
    );
    let website_search_user_agent =
        or_default("BIZFINDER_WEBSITE_SEARCH_USER_AGENT", DEFAULT_BROWSER_USER_AGENT);
    let website_search_timeout_secs = parse_timeout("BIZFINDER_WEBSITE_SEARCH_TIMEOUT_SECS", "10")?;
    let website_search_delay_ms = parse_u64("BIZFINDER_WEBSITE_SEARCH_DELAY_MS", "1000")?;

    Ok(AppConfig {
        log_level,
        log_file,
        user_agent,
        nominatim_url,
        overpass_url,
        region_abbrev,
        region_name,
        geocode_timeout_secs,
        overpass_timeout_secs,
        overpass_max_attempts,
        overpass_backoff_base_secs,
        overpass_backoff_multiplier,
        category_tags,
        default_radius_km,
        website_search_url,
        website_search_user_agent,
        website_search_timeout_secs,
        website_search_delay_ms,
    })
}

/// Split a comma-separated tag list, dropping blanks and keeping order.
fn parse_category_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
