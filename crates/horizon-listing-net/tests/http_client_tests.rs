//! Tests for the cancellable HTTP client.

use std::time::Duration;

use horizon_listing_core::CancellationToken;
use horizon_listing_net::{HttpClient, HttpClientBuilder, HttpMethod, NetworkError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_client_builder() {
    let client = HttpClientBuilder::new()
        .timeout(Duration::from_secs(60))
        .no_cookies()
        .build()
        .expect("Failed to build client");

    assert_eq!(client.config().timeout, Some(Duration::from_secs(60)));
    assert!(!client.config().cookies_enabled);
}

#[tokio::test]
async fn test_request_builder_chain() {
    let client = HttpClient::new().expect("Failed to build client");

    let request = client
        .get("https://example.com/api/items")
        .header("Accept", "application/json")
        .query("page", "2")
        .query("per_page", "10")
        .build();

    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.query.len(), 2);
    assert_eq!(
        request.full_url().unwrap().as_str(),
        "https://example.com/api/items?page=2&per_page=10"
    );
}

#[tokio::test]
async fn test_json_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"total": 3})))
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let token = CancellationToken::new();
    let body: serde_json::Value = client
        .get(format!("{}/items", server.uri()))
        .query("page", "1")
        .json_response(&token)
        .await
        .unwrap();

    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let token = CancellationToken::new();
    let result: Result<serde_json::Value, _> =
        client.get(server.uri()).json_response(&token).await;

    match result {
        Err(NetworkError::HttpStatus { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("missing"));
        }
        other => panic!("Expected HTTP status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancellation_drops_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let result = client.get(server.uri()).send_cancellable(&token).await;
    assert!(matches!(result, Err(NetworkError::Cancelled)));
}

#[tokio::test]
async fn test_already_cancelled_token_skips_request() {
    let client = HttpClient::new().unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let result = client
        .get("http://127.0.0.1:1/unreachable")
        .send_cancellable(&token)
        .await;
    assert!(result.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn test_json_accept_header_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let body: Vec<serde_json::Value> = client
        .get(server.uri())
        .json_response(&CancellationToken::new())
        .await
        .unwrap();
    assert!(body.is_empty());
}
