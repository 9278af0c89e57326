use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: PathBuf,
    pub user_agent: String,
    pub nominatim_url: String,
    pub overpass_url: String,
    /// Appended as `"<place>, <abbrev>"` on the first attempt for unqualified places.
    pub region_abbrev: String,
    /// Appended as `"<place>, <name>"` when the abbreviated attempt finds nothing.
    pub region_name: String,
    pub geocode_timeout_secs: u64,
    pub overpass_timeout_secs: u64,
    /// Total retrieval attempts, including the first.
    pub overpass_max_attempts: u32,
    pub overpass_backoff_base_secs: u64,
    pub overpass_backoff_multiplier: u32,
    /// Tag keys consulted in priority order when classifying a point of interest.
    pub category_tags: Vec<String>,
    pub default_radius_km: f64,
    /// HTML search endpoint used by the optional website lookup.
    pub website_search_url: String,
    pub website_search_user_agent: String,
    pub website_search_timeout_secs: u64,
    /// Pause between consecutive website lookups.
    pub website_search_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("user_agent", &self.user_agent)
            .field("nominatim_url", &self.nominatim_url)
            .field("overpass_url", &self.overpass_url)
            .field("region_abbrev", &self.region_abbrev)
            .field("region_name", &self.region_name)
            .field("geocode_timeout_secs", &self.geocode_timeout_secs)
            .field("overpass_timeout_secs", &self.overpass_timeout_secs)
            .field("overpass_max_attempts", &self.overpass_max_attempts)
            .field(
                "overpass_backoff_base_secs",
                &self.overpass_backoff_base_secs,
            )
            .field(
                "overpass_backoff_multiplier",
                &self.overpass_backoff_multiplier,
            )
            .field("category_tags", &self.category_tags.join(","))
            .field("default_radius_km", &self.default_radius_km)
            .field("website_search_url", &self.website_search_url)
            .field("website_search_user_agent", &self.website_search_user_agent)
            .field(
                "website_search_timeout_secs",
                &self.website_search_timeout_secs,
            )
            .field("website_search_delay_ms", &self.website_search_delay_ms)
            .finish()
    }
}
