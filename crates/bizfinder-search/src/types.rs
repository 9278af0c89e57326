//! Wire and raw record types for the Overpass and Nominatim services.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// One named node as returned by the data source, before normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPointOfInterest {
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl RawPointOfInterest {
    /// Returns the tag value for `key` when present and non-empty.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Top-level Overpass JSON envelope.
///
/// Elements are kept as raw JSON so one undecodable element can be skipped
/// without failing the whole response.
#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<serde_json::Value>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// One entry of a Nominatim `/search?format=json` response.
///
/// Nominatim returns coordinates as decimal strings.
#[derive(Debug, Deserialize)]
pub(crate) struct NominatimPlace {
    #[serde(deserialize_with = "f64_from_str")]
    pub lat: f64,
    #[serde(deserialize_with = "f64_from_str")]
    pub lon: f64,
    #[serde(default)]
    pub display_name: Option<String>,
}

fn f64_from_str<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|e| serde::de::Error::custom(format!("invalid coordinate {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominatim_place_parses_string_coordinates() {
        let places: Vec<NominatimPlace> = serde_json::from_str(
            r#"[{"lat": "39.7392364", "lon": "-104.984862", "display_name": "Denver, Colorado"}]"#,
        )
        .unwrap();
        assert!((places[0].lat - 39.739_236_4).abs() < 1e-9);
        assert!((places[0].lon + 104.984_862).abs() < 1e-9);
    }

    #[test]
    fn nominatim_place_rejects_non_numeric_coordinates() {
        let result: Result<Vec<NominatimPlace>, _> =
            serde_json::from_str(r#"[{"lat": "north", "lon": "-104.98"}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn raw_poi_defaults_missing_tags_and_coordinates() {
        let raw: RawPointOfInterest = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(raw.id, 7);
        assert!(raw.lat.is_none());
        assert!(raw.tags.is_empty());
    }

    #[test]
    fn tag_treats_empty_values_as_absent() {
        let raw: RawPointOfInterest =
            serde_json::from_str(r#"{"id": 1, "tags": {"website": "", "shop": "bakery"}}"#)
                .unwrap();
        assert_eq!(raw.tag("website"), None);
        assert_eq!(raw.tag("shop"), Some("bakery"));
        assert_eq!(raw.tag("amenity"), None);
    }
}
