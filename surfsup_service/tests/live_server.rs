//! Smoke tests against a running `surfsup` server.
//!
//! Start the server first (against Postgres or the sample fixture), then:
//!
//!   SURFSUP_URL=http://127.0.0.1:5000 cargo test --test live_server -- --ignored
//!
//! These only check shapes and status codes, never dataset-specific values.

use std::time::Duration;

use serde_json::Value;

fn base_url() -> String {
    std::env::var("SURFSUP_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string())
}

fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
}

fn get_json(path: &str) -> (u16, Value) {
    let url = format!("{}{}", base_url(), path);
    let response = client()
        .get(&url)
        .send()
        .unwrap_or_else(|e| panic!("request to {} failed - is the server running? {}", url, e));
    let status = response.status().as_u16();
    let body = response.json::<Value>().expect("response should be JSON");
    (status, body)
}

#[test]
#[ignore] // Requires a running server
fn live_index_lists_routes() {
    let body = client()
        .get(base_url())
        .send()
        .expect("index request failed")
        .text()
        .expect("index body should be text");
    assert!(body.contains("/api/v1.0/precipitation"));
    assert!(body.contains("/api/v1.0/<start>/<end>"));
}

#[test]
#[ignore] // Requires a running server
fn live_collection_routes_have_expected_shapes() {
    let (status, precipitation) = get_json("/api/v1.0/precipitation");
    assert_eq!(status, 200);
    assert!(precipitation.is_object());

    let (status, stations) = get_json("/api/v1.0/stations");
    assert_eq!(status, 200);
    assert!(stations.as_array().is_some_and(|a| a.iter().all(Value::is_string)));

    let (status, tobs) = get_json("/api/v1.0/tobs");
    assert_eq!(status, 200);
    assert!(tobs.as_array().is_some_and(|a| a.iter().all(Value::is_number)));
}

#[test]
#[ignore] // Requires a running server
fn live_summary_routes() {
    let (status, summary) = get_json("/api/v1.0/2016-08-23/2017-08-23");
    assert_eq!(status, 200);
    for key in ["Start Date", "End Date", "Min Temp", "Avg Temp", "Max Temp"] {
        assert!(summary.get(key).is_some(), "missing {}", key);
    }

    let (status, error) = get_json("/api/v1.0/2017-13-40");
    assert_eq!(status, 400);
    assert!(error["error"].is_string());
}
