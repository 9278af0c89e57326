use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// A named point of interest, normalized into the shape the presentation
/// layer renders and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBusiness {
    /// Display name; unique within one search result.
    pub name: String,
    /// `"<street> <housenumber>"`, or empty when both parts are missing.
    pub address: String,
    /// Value of the first matching category tag, or `"unknown"`.
    pub category: String,
    pub website: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Reserved for downstream follow-up marking. Always `false` when created.
    pub incomplete: bool,
}

impl NormalizedBusiness {
    #[must_use]
    pub fn has_website(&self) -> bool {
        self.website.is_some()
    }

    /// A record is complete once it has a website and nobody has flagged it.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.has_website() && !self.incomplete
    }

    #[must_use]
    pub fn website_status(&self) -> &'static str {
        if self.has_website() {
            "Has Website"
        } else {
            "No Website"
        }
    }

    #[must_use]
    pub fn data_status(&self) -> &'static str {
        if self.is_complete() {
            "Complete"
        } else {
            "Incomplete"
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// The terminal success value of one search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Resolved center the data source was queried around.
    pub center: Coordinates,
    pub businesses: Vec<NormalizedBusiness>,
}

impl SearchOutcome {
    #[must_use]
    pub fn without_website_count(&self) -> usize {
        self.businesses.iter().filter(|b| !b.has_website()).count()
    }
}

/// One progress notification emitted while a search runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Records processed so far.
    pub processed: usize,
    /// Records returned by the data source (0 before retrieval completes).
    pub total: usize,
    /// Businesses kept so far, before deduplication.
    pub kept: usize,
    pub status: String,
}

impl Progress {
    #[must_use]
    pub fn status(message: impl Into<String>) -> Self {
        Self {
            processed: 0,
            total: 0,
            kept: 0,
            status: message.into(),
        }
    }
}
