//! Integration tests for `PlacesClient` using wiremock HTTP mocks.

use revmig_core::RetryPolicy;
use revmig_places::{PlacesClient, PlacesError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 5, "revmig-test/0.1", RetryPolicy::none(), base_url)
        .expect("client construction should not fail")
}

fn candidate(id: &str, name: &str, lat: f64, lng: f64) -> serde_json::Value {
    json!({
        "place_id": id,
        "name": name,
        "formatted_address": "1 Main St, Springfield",
        "geometry": { "location": { "lat": lat, "lng": lng } },
        "types": ["cafe", "food", "point_of_interest"]
    })
}

#[tokio::test]
async fn resolve_returns_first_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .and(query_param("key", "test-key"))
        .and(query_param("query", "Cafe A 1 Main St"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [
                candidate("p1", "Cafe A", 1.0, 2.0),
                candidate("p2", "Cafe A Annex", 3.0, 4.0)
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let place = client
        .resolve("Cafe A", "1 Main St")
        .await
        .expect("request should succeed")
        .expect("a place should resolve");

    assert_eq!(place.id, "p1");
    assert!((place.lat - 1.0).abs() < f64::EPSILON);
    assert!((place.lng - 2.0).abs() < f64::EPSILON);
    assert_eq!(place.category_tags, vec!["cafe", "food", "point_of_interest"]);
}

#[tokio::test]
async fn resolve_zero_results_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let place = client.resolve("Nowhere", "0 Void Rd").await.unwrap();
    assert!(place.is_none());
}

#[tokio::test]
async fn over_query_limit_is_quota_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OVER_QUERY_LIMIT",
            "results": [],
            "error_message": "You have exceeded your daily request quota for this API."
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.resolve("Cafe A", "1 Main St").await.unwrap_err();
    assert!(matches!(err, PlacesError::QuotaExceeded(ref m) if m.contains("daily request quota")));
}

#[tokio::test]
async fn request_denied_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.resolve("Cafe A", "1 Main St").await.unwrap_err();
    assert!(matches!(err, PlacesError::ApiError { ref status, .. } if status == "REQUEST_DENIED"));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.text_search("Cafe A").await.unwrap_err();
    assert!(matches!(err, PlacesError::Deserialize { .. }));
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [candidate("p9", "Cafe Z", 5.0, 6.0)]
        })))
        .mount(&server)
        .await;

    let client = PlacesClient::with_base_url(
        "test-key",
        5,
        "revmig-test/0.1",
        RetryPolicy::new(2, 0),
        &server.uri(),
    )
    .unwrap();

    let place = client.resolve("Cafe Z", "").await.unwrap().unwrap();
    assert_eq!(place.id, "p9");
}

#[tokio::test]
async fn server_error_without_retries_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.resolve("Cafe A", "1 Main St").await.unwrap_err();
    assert!(matches!(err, PlacesError::Http(_)));
}
