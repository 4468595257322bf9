//! Tests for API-backed listings against a mock server.

use std::time::Duration;

use horizon_listing::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(total: i64, names: &[(i64, &str)]) -> Value {
    let data: Vec<Value> = names
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    json!({ "total": total, "data": data })
}

fn source(server: &MockServer) -> ApiSource {
    ApiSource::builder()
        .endpoint(format!("{}/people", server.uri()))
        .translate("search", "q")
        .build()
        .expect("Failed to build source")
}

fn keys(listing: &ApiListing) -> Vec<String> {
    listing.item_keys().iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_load_renders_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .and(query_param_is_missing("q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "data": [{ "id": 1, "name": "Ada" }, { "id": 2, "name": "Bob" }],
            "search_params": { "page": 1, "per_page": 2 },
            "sort_values": ["name", "age"],
            "titles": { "name": "Name" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = ListingBuilder::new("people", source(&server))
        .sorted(SortedConfig::default())
        .searchable(SearchableConfig::default())
        .paged(PagedConfig {
            per_page: 2,
            ..PagedConfig::default()
        })
        .build()
        .unwrap();

    let applied = listing.load().await.unwrap();
    assert_eq!(keys(&listing), ["1", "2"]);
    assert_eq!(applied.number("page"), Some(1));

    let paging = listing.paged().unwrap().paging();
    assert_eq!(paging.total(), 3);
    assert_eq!(paging.page_count(), 2);

    let columns = listing.sorted().unwrap().columns();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].label, "Name");
    assert_eq!(listing.titles().get("name").map(String::as_str), Some("Name"));
}

#[tokio::test]
async fn test_search_uses_translated_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "data": [{ "id": 1, "name": "Ada" }],
            "search_params": { "q": "ada" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = ListingBuilder::new("people", source(&server))
        .searchable(SearchableConfig::default())
        .build()
        .unwrap();

    let applied = listing.search("ada").await.unwrap();
    assert_eq!(applied.text("search"), Some("ada"));
    assert_eq!(keys(&listing), ["1"]);

    // Same query again is a no-op; the mock expects a single request.
    listing.search("ada").await.unwrap();
}

#[tokio::test]
async fn test_newer_request_supersedes_older() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(1, &[(1, "slow")]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(1, &[(2, "fast")])))
        .mount(&server)
        .await;

    let listing = ListingBuilder::new("people", source(&server))
        .searchable(SearchableConfig::default())
        .build()
        .unwrap();

    let (slow, fast) = tokio::join!(listing.search("slow"), listing.search("fast"));

    assert!(matches!(slow, Err(ListingError::Aborted)));
    assert_eq!(fast.unwrap().text("search"), Some("fast"));
    assert_eq!(keys(&listing), ["2"]);
    assert!(!listing.is_loading());
}

#[tokio::test]
async fn test_object_data_under_model_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "data": { "rows": { "b": { "name": "Bea" }, "a": { "name": "Al" } } }
        })))
        .mount(&server)
        .await;

    let source = ApiSource::builder()
        .endpoint(format!("{}/people", server.uri()))
        .data_model_path("rows")
        .build()
        .unwrap();
    let listing = ListingBuilder::new("people", source).build().unwrap();
    listing.load().await.unwrap();

    let keys: Vec<String> = listing.item_keys().iter().map(ToString::to_string).collect();
    assert_eq!(keys, ["b", "a"]);
    assert_eq!(listing.items()[1].value["name"], "Al");
}

#[tokio::test]
async fn test_stream_entries_without_ids_accumulate() {
    let server = MockServer::start().await;
    for (page, names) in [("1", ["a", "b"]), ("2", ["c", "d"])] {
        let data: Vec<Value> = names.iter().map(|name| json!({ "name": name })).collect();
        Mock::given(method("GET"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 4, "data": data })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let listing = ListingBuilder::new("people", source(&server))
        .paged(PagedConfig {
            per_page: 2,
            method: PagingMethod::Stream,
            ..PagedConfig::default()
        })
        .build()
        .unwrap();
    listing.load().await.unwrap();
    assert!(listing.go_to_next_page().await.unwrap());

    assert_eq!(listing.item_count(), 4);
    assert_eq!(keys(&listing), ["#0", "#1", "#2", "#3"]);
    let names: Vec<Value> = listing.items().iter().map(|item| item.value["name"].clone()).collect();
    assert_eq!(names, ["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_repeated_search_in_flight_joins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "ada"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(1, &[(1, "Ada")]))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listing = ListingBuilder::new("people", source(&server))
        .searchable(SearchableConfig::default())
        .build()
        .unwrap();

    let (first, second) = tokio::join!(listing.search("ada"), listing.search("ada"));
    let first = first.unwrap();
    assert_eq!(first.text("search"), Some("ada"));
    assert_eq!(second.unwrap(), first);
    assert_eq!(keys(&listing), ["1"]);
}

#[tokio::test]
async fn test_delete_items_then_reload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "data": [{ "id": 1, "name": "Ada" }, { "id": 2, "name": "Bob" }],
            "endpoints": { "delete": "/people/{key}" }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(1, &[(2, "Bob")])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/people/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let listing = ListingBuilder::new("people", source(&server))
        .selectable()
        .build()
        .unwrap();
    listing.load().await.unwrap();

    let selectable = listing.selectable().unwrap();
    assert!(selectable.select(&"1".into()));
    assert_eq!(
        listing.endpoint_url("delete", &"1".into()).unwrap().unwrap().path(),
        "/people/1"
    );

    listing.delete_items(&["1".into()]).await.unwrap();
    assert_eq!(keys(&listing), ["2"]);
    assert_eq!(selectable.selected_count(), 0);
}

#[tokio::test]
async fn test_delete_without_endpoint_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(1, &[(1, "Ada")])))
        .mount(&server)
        .await;

    let listing = ListingBuilder::new("people", source(&server)).build().unwrap();
    listing.load().await.unwrap();

    let result = listing.delete_items(&["1".into()]).await;
    assert!(matches!(result, Err(ListingError::Validation(_))));
}

#[tokio::test]
async fn test_server_error_ends_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let listing = ListingBuilder::new("people", source(&server)).build().unwrap();
    let result = listing.load().await;

    assert!(matches!(result, Err(ListingError::Network(_))));
    assert!(!listing.is_loading());
    assert!(listing.is_empty());
}

#[tokio::test]
async fn test_negative_total_is_range_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(-1, &[])))
        .mount(&server)
        .await;

    let listing = ListingBuilder::new("people", source(&server)).build().unwrap();
    assert!(matches!(listing.load().await, Err(ListingError::Range(_))));
    assert!(!listing.is_loading());
}

#[test]
fn test_source_requires_http_endpoint() {
    assert!(matches!(
        ApiSource::builder().build(),
        Err(ListingError::Validation(_))
    ));
    assert!(matches!(
        ApiSource::builder().endpoint("   ").build(),
        Err(ListingError::Validation(_))
    ));
    assert!(matches!(
        ApiSource::builder().endpoint("ftp://example.com/people").build(),
        Err(ListingError::Validation(_))
    ));
}
