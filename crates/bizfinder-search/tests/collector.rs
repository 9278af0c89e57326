//! Integration tests for `Collector` using in-memory and wiremock data sources.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bizfinder_core::{Coordinates, Progress};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bizfinder_search::{
    dedupe_by_name, CancelToken, CategoryFilter, CategoryRules, Collector, OverpassClient,
    PoiSource, RawPointOfInterest, RetryPolicy, SearchError,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Returns a fixed list of nodes, optionally filtered by distance from the
/// query center like a real radius query.
struct StaticSource {
    nodes: Vec<RawPointOfInterest>,
    honour_radius: bool,
    calls: Arc<AtomicU32>,
}

impl StaticSource {
    fn new(nodes: Vec<RawPointOfInterest>) -> Self {
        Self {
            nodes,
            honour_radius: false,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    fn within_radius(nodes: Vec<RawPointOfInterest>) -> Self {
        Self {
            honour_radius: true,
            ..Self::new(nodes)
        }
    }
}

impl PoiSource for StaticSource {
    async fn fetch(
        &self,
        center: Coordinates,
        radius_m: f64,
    ) -> Result<Vec<RawPointOfInterest>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.honour_radius {
            return Ok(self.nodes.clone());
        }
        Ok(self
            .nodes
            .iter()
            .filter(|n| {
                let at = Coordinates::new(n.lat.unwrap_or_default(), n.lon.unwrap_or_default());
                center.distance_km(&at) * 1000.0 <= radius_m
            })
            .cloned()
            .collect())
    }
}

/// Fails the first `failures` calls, then returns `nodes`.
struct FlakySource {
    failures: u32,
    nodes: Vec<RawPointOfInterest>,
    calls: Arc<AtomicU32>,
}

impl PoiSource for FlakySource {
    async fn fetch(
        &self,
        _center: Coordinates,
        _radius_m: f64,
    ) -> Result<Vec<RawPointOfInterest>, SearchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            Err(SearchError::UnexpectedStatus {
                status: 504,
                url: format!("https://overpass.test/attempt/{}", n + 1),
            })
        } else {
            Ok(self.nodes.clone())
        }
    }
}

fn node(id: u64, lat: f64, lon: f64, tags: &[(&str, &str)]) -> RawPointOfInterest {
    RawPointOfInterest {
        id,
        lat: Some(lat),
        lon: Some(lon),
        tags: tags
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn denver() -> Coordinates {
    Coordinates::new(39.74, -104.99)
}

fn instant_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::ZERO, 2)
}

fn collector<S: PoiSource>(source: S) -> Collector<S> {
    Collector::new(source, instant_policy(), CategoryRules::default())
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cafe_and_hardware_store_are_classified_in_order() {
    let source = StaticSource::new(vec![
        node(1, 39.741, -104.991, &[("name", "Joe's Cafe"), ("amenity", "cafe")]),
        node(
            2,
            39.742,
            -104.992,
            &[
                ("name", "Acme Shop"),
                ("shop", "hardware"),
                ("website", "http://acme.test"),
            ],
        ),
    ]);

    let out = collector(source)
        .collect(denver(), 5.0, CategoryFilter::All, &CancelToken::new(), |_| {})
        .await
        .expect("collect should succeed");

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].name, "Joe's Cafe");
    assert_eq!(out[0].category, "cafe");
    assert!(!out[0].has_website());
    assert_eq!(out[1].name, "Acme Shop");
    assert_eq!(out[1].category, "hardware");
    assert_eq!(out[1].website.as_deref(), Some("http://acme.test"));
}

#[tokio::test]
async fn duplicate_names_keep_first_encountered() {
    let source = StaticSource::new(vec![
        node(1, 39.750, -104.990, &[("name", "City Hall"), ("amenity", "townhall")]),
        node(2, 39.760, -104.980, &[("name", "City Hall"), ("office", "government")]),
    ]);

    let out = collector(source)
        .collect(denver(), 5.0, CategoryFilter::All, &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].category, "townhall");
    assert!((out[0].latitude - 39.750).abs() < f64::EPSILON);
}

#[tokio::test]
async fn unnamed_nodes_produce_no_records() {
    let source = StaticSource::new(vec![
        node(1, 39.74, -104.99, &[("amenity", "bench")]),
        node(2, 39.74, -104.99, &[("name", ""), ("shop", "kiosk")]),
        node(3, 39.74, -104.99, &[]),
    ]);

    let out = collector(source)
        .collect(denver(), 5.0, CategoryFilter::All, &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert!(out.is_empty());
}

#[tokio::test]
async fn malformed_record_is_skipped_without_aborting() {
    let mut broken = node(2, 0.0, 0.0, &[("name", "No Coordinates")]);
    broken.lat = None;
    let source = StaticSource::new(vec![
        node(1, 39.74, -104.99, &[("name", "First")]),
        broken,
        node(3, 39.74, -104.99, &[("name", "Third")]),
    ]);

    let out = collector(source)
        .collect(denver(), 5.0, CategoryFilter::All, &CancelToken::new(), |_| {})
        .await
        .unwrap();

    let names: Vec<&str> = out.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["First", "Third"]);
}

#[tokio::test]
async fn progress_is_reported_once_per_record() {
    let source = StaticSource::new(vec![
        node(1, 39.74, -104.99, &[("name", "A")]),
        node(2, 39.74, -104.99, &[("amenity", "bench")]),
        node(3, 39.74, -104.99, &[("name", "A")]),
        node(4, 39.74, -104.99, &[("name", "B")]),
    ]);

    let mut events: Vec<Progress> = Vec::new();
    let out = collector(source)
        .collect(
            denver(),
            5.0,
            CategoryFilter::All,
            &CancelToken::new(),
            |p| events.push(p),
        )
        .await
        .unwrap();

    let counts: Vec<(usize, usize, usize)> =
        events.iter().map(|p| (p.processed, p.total, p.kept)).collect();
    assert_eq!(counts, [(1, 4, 1), (2, 4, 1), (3, 4, 2), (4, 4, 3)]);
    assert_eq!(events[3].status, "Processing nodes: 4/4");
    // Running kept count is pre-dedupe; the final list is not.
    assert_eq!(out.len(), 2);
}

#[tokio::test]
async fn restaurant_filter_drops_other_records() {
    let source = StaticSource::new(vec![
        node(1, 39.74, -104.99, &[("name", "Joe's Cafe"), ("amenity", "cafe")]),
        node(2, 39.74, -104.99, &[("name", "Acme Shop"), ("shop", "hardware")]),
        node(3, 39.74, -104.99, &[("name", "Bank"), ("amenity", "bank")]),
    ]);

    let mut last = None;
    let out = collector(source)
        .collect(
            denver(),
            5.0,
            CategoryFilter::Restaurants,
            &CancelToken::new(),
            |p| last = Some(p),
        )
        .await
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].name, "Joe's Cafe");
    assert_eq!(last.map(|p| p.processed), Some(3));
}

#[tokio::test]
async fn smaller_radius_yields_subset_of_larger_radius() {
    let center = denver();
    let nodes = vec![
        node(1, 39.7405, -104.9905, &[("name", "Very Close")]),
        node(2, 39.7500, -104.9900, &[("name", "One Km")]),
        node(3, 39.7700, -104.9900, &[("name", "Three Km")]),
        node(4, 39.8000, -104.9900, &[("name", "Seven Km")]),
        node(5, 39.9000, -104.9900, &[("name", "Far Away")]),
    ];
    let collector = collector(StaticSource::within_radius(nodes));

    let radii = [0.5, 1.5, 4.0, 10.0, 25.0];
    for window in radii.windows(2) {
        let small = collector
            .collect(center, window[0], CategoryFilter::All, &CancelToken::new(), |_| {})
            .await
            .unwrap();
        let large = collector
            .collect(center, window[1], CategoryFilter::All, &CancelToken::new(), |_| {})
            .await
            .unwrap();
        for b in &small {
            assert!(
                large.iter().any(|l| l.name == b.name),
                "{} within {} km missing from {} km result",
                b.name,
                window[0],
                window[1]
            );
        }
        assert!(small.len() <= large.len());
    }
}

#[tokio::test]
async fn dedupe_of_collected_output_is_a_no_op() {
    let source = StaticSource::new(vec![
        node(1, 39.74, -104.99, &[("name", "A")]),
        node(2, 39.74, -104.99, &[("name", "B")]),
        node(3, 39.74, -104.99, &[("name", "A")]),
    ]);

    let out = collector(source)
        .collect(denver(), 5.0, CategoryFilter::All, &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(dedupe_by_name(out.clone()), out);
}

// ---------------------------------------------------------------------------
// Retry behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exhausting_three_attempts_surfaces_one_data_source_error() {
    let calls = Arc::new(AtomicU32::new(0));
    let source = FlakySource {
        failures: u32::MAX,
        nodes: Vec::new(),
        calls: Arc::clone(&calls),
    };

    let mut events = 0usize;
    let result = collector(source)
        .collect(
            denver(),
            5.0,
            CategoryFilter::All,
            &CancelToken::new(),
            |_| events += 1,
        )
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(events, 0, "no records may be reported from a failed retrieval");
    match result {
        Err(SearchError::DataSource { attempts, reason }) => {
            assert_eq!(attempts, 3);
            assert!(reason.contains("attempt/3"), "last failure expected, got: {reason}");
        }
        other => panic!("expected DataSource, got: {other:?}"),
    }
}

#[tokio::test]
async fn recovers_when_a_later_attempt_succeeds() {
    let calls = Arc::new(AtomicU32::new(0));
    let source = FlakySource {
        failures: 2,
        nodes: vec![node(1, 39.74, -104.99, &[("name", "Survivor")])],
        calls: Arc::clone(&calls),
    };

    let out = collector(source)
        .collect(denver(), 5.0, CategoryFilter::All, &CancelToken::new(), |_| {})
        .await
        .expect("third attempt should succeed");

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(out.len(), 1);
}

#[tokio::test]
async fn overpass_client_is_retried_through_collector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(504))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "elements": [
                {"type": "node", "id": 1, "lat": 39.74, "lon": -104.99,
                 "tags": {"name": "Joe's Cafe", "amenity": "cafe"}}
            ]
        })))
        .mount(&server)
        .await;

    let client = OverpassClient::new(
        &format!("{}/api/interpreter", server.uri()),
        5,
        "bizfinder-test/0.1",
    )
    .unwrap();
    let out = collector(client)
        .collect(denver(), 5.0, CategoryFilter::All, &CancelToken::new(), |_| {})
        .await;

    assert!(out.is_ok(), "expected Ok after retries, got: {out:?}");
    assert_eq!(out.unwrap()[0].name, "Joe's Cafe");
}

// ---------------------------------------------------------------------------
// Validation and cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_radius_is_rejected_before_fetching() {
    let source = StaticSource::new(Vec::new());
    let calls = Arc::clone(&source.calls);
    let collector = collector(source);

    for radius in [0.0, -3.0, f64::NAN] {
        let result = collector
            .collect(denver(), radius, CategoryFilter::All, &CancelToken::new(), |_| {})
            .await;
        assert!(matches!(result, Err(SearchError::InvalidRequest(_))));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancellation_between_records_returns_cancelled() {
    let source = StaticSource::new(vec![
        node(1, 39.74, -104.99, &[("name", "A")]),
        node(2, 39.74, -104.99, &[("name", "B")]),
        node(3, 39.74, -104.99, &[("name", "C")]),
    ]);
    let cancel = CancelToken::new();
    let trigger = cancel.clone();

    let result = collector(source)
        .collect(denver(), 5.0, CategoryFilter::All, &cancel, |p| {
            if p.processed == 1 {
                trigger.cancel();
            }
        })
        .await;

    assert!(
        matches!(result, Err(SearchError::Cancelled)),
        "expected Cancelled, got: {result:?}"
    );
}

#[tokio::test]
async fn cancelled_before_retrieval_makes_no_call() {
    let source = StaticSource::new(Vec::new());
    let calls = Arc::clone(&source.calls);
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = collector(source)
        .collect(denver(), 5.0, CategoryFilter::All, &cancel, |_| {})
        .await;

    assert!(matches!(result, Err(SearchError::Cancelled)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Never answers; only cancellation can end a fetch.
struct HangingSource;

impl PoiSource for HangingSource {
    async fn fetch(
        &self,
        _center: Coordinates,
        _radius_m: f64,
    ) -> Result<Vec<RawPointOfInterest>, SearchError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn cancellation_during_fetch_returns_promptly() {
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        collector(HangingSource).collect(denver(), 5.0, CategoryFilter::All, &cancel, |_| {}),
    )
    .await
    .expect("cancel should interrupt an in-flight fetch");

    assert!(
        matches!(result, Err(SearchError::Cancelled)),
        "expected Cancelled, got: {result:?}"
    );
}
