//! Self-contained Leaflet map of search results.

use std::path::Path;

use anyhow::Context;
use bizfinder_core::{Coordinates, NormalizedBusiness};
use serde_json::json;

pub(crate) const DEFAULT_ZOOM: u8 = 13;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Business Finder</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
<style>
html, body, #map { height: 100%; margin: 0; }
.pin { width: 14px; height: 14px; border-radius: 50%; border: 2px solid #fff; box-shadow: 0 0 2px #333; }
</style>
</head>
<body>
<div id="map"></div>
<script>
var data = __DATA__;
var map = L.map('map').setView([data.center.lat, data.center.lon], data.zoom);
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
  maxZoom: 19,
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
function esc(s) {
  var d = document.createElement('div');
  d.textContent = s;
  return d.innerHTML;
}
var cluster = L.markerClusterGroup();
data.markers.forEach(function (m) {
  var icon = L.divIcon({
    className: '',
    html: '<div class="pin" style="background:' + m.color + '"></div>',
    iconSize: [18, 18]
  });
  L.marker([m.lat, m.lon], { icon: icon })
    .bindPopup(esc(m.name) + '<br>' + esc(m.address))
    .addTo(cluster);
});
map.addLayer(cluster);
</script>
</body>
</html>
"#;

/// Marker color: green when the business has a website, red otherwise.
fn marker_color(business: &NormalizedBusiness) -> &'static str {
    if business.has_website() {
        "green"
    } else {
        "red"
    }
}

/// Renders the map page centered on `center` with one marker per row.
///
/// # Errors
///
/// Returns an error if the marker data cannot be serialized.
pub(crate) fn render_map(center: Coordinates, rows: &[&NormalizedBusiness]) -> anyhow::Result<String> {
    let markers: Vec<serde_json::Value> = rows
        .iter()
        .map(|b| {
            json!({
                "name": b.name,
                "address": b.address,
                "lat": b.latitude,
                "lon": b.longitude,
                "color": marker_color(b),
            })
        })
        .collect();
    let data = json!({
        "center": { "lat": center.latitude, "lon": center.longitude },
        "zoom": DEFAULT_ZOOM,
        "markers": markers,
    });

    // Keep embedded strings from closing the script element.
    let embedded = serde_json::to_string(&data)?.replace("</", "<\\/");
    Ok(TEMPLATE.replace("__DATA__", &embedded))
}

/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written.
pub(crate) fn write_map_file(
    path: &Path,
    center: Coordinates,
    rows: &[&NormalizedBusiness],
) -> anyhow::Result<()> {
    let html = render_map(center, rows)?;
    std::fs::write(path, html)
        .with_context(|| format!("failed to write map file {}", path.display()))
}
