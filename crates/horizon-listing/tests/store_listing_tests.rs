//! Tests for store-backed listings.

use std::sync::Arc;

use horizon_listing::prelude::*;
use horizon_listing::StoreEvent;
use parking_lot::Mutex;
use serde_json::json;

/// Route listing logs to the test output; `RUST_LOG` selects the level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn people(count: i64) -> MemoryStore {
    MemoryStore::from_entries((1..=count).map(|i| {
        (
            ItemKey::from(i),
            json!({ "name": format!("person {i:02}"), "score": i }),
        )
    }))
}

fn paged(per_page: usize, method: PagingMethod) -> PagedConfig {
    PagedConfig {
        per_page,
        method,
        ..PagedConfig::default()
    }
}

fn keys<St: LocalStore>(listing: &StoreListing<St>) -> Vec<String> {
    listing.item_keys().iter().map(ToString::to_string).collect()
}

fn record(listing: &StoreListing<MemoryStore>) -> Arc<Mutex<Vec<ListingEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    listing
        .events()
        .connect(move |event: &ListingEvent| sink.lock().push(event.clone()));
    events
}

#[tokio::test]
async fn test_deferred_size_and_first_page() {
    let store = Arc::new(people(23).with_deferred_size());
    let listing = ListingBuilder::new("people", StoreSource::new(store))
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();

    listing.load().await.unwrap();

    let paging = listing.paged().unwrap().paging();
    assert_eq!(paging.total(), 23);
    assert_eq!(paging.page_count(), 5);
    assert_eq!(keys(&listing), ["1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn test_regular_navigation() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(23))))
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();

    listing.go_to_page(3).await.unwrap();
    assert_eq!(keys(&listing), ["11", "12", "13", "14", "15"]);

    assert!(listing.navigate(NavTarget::Last).await.unwrap());
    assert_eq!(keys(&listing), ["21", "22", "23"]);
    assert!(!listing.go_to_next_page().await.unwrap());
    assert!(!listing.navigate(NavTarget::Page(5)).await.unwrap());

    assert!(listing.go_to_previous_page().await.unwrap());
    assert_eq!(listing.paged().unwrap().paging().page(), 4);
}

#[tokio::test]
async fn test_per_page_change_resets_page() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(23))))
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();
    listing.go_to_page(3).await.unwrap();

    let applied = listing.set_per_page(10).await.unwrap();
    assert_eq!(applied.number("page"), Some(1));
    assert_eq!(applied.number("per_page"), Some(10));
    assert_eq!(listing.item_count(), 10);
    assert_eq!(listing.paged().unwrap().paging().page_count(), 3);
}

#[tokio::test]
async fn test_matching_request_is_skipped() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(12))))
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();
    let events = record(&listing);

    listing.go_to_page(2).await.unwrap();
    listing.go_to_page(2).await.unwrap();

    let requests = events
        .lock()
        .iter()
        .filter(|event| matches!(event, ListingEvent::RequestParams { .. }))
        .count();
    assert_eq!(requests, 1);

    // Forcing runs the cycle anyway.
    listing
        .set_search_params(SearchParams::new(), SetParamsOptions::forced())
        .await
        .unwrap();
    let requests = events
        .lock()
        .iter()
        .filter(|event| matches!(event, ListingEvent::RequestParams { .. }))
        .count();
    assert_eq!(requests, 2);
}

#[tokio::test]
async fn test_unknown_params_are_dropped() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(3))))
        .build()
        .unwrap();
    listing.load().await.unwrap();

    let applied = listing
        .set_search_params(
            SearchParams::new().with("color", "red"),
            SetParamsOptions::default(),
        )
        .await
        .unwrap();
    assert!(!applied.contains("color"));
    assert!(!listing.is_registered("color"));
}

#[tokio::test]
async fn test_single_flight_keeps_latest() {
    init_tracing();
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(23))))
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();
    let events = record(&listing);

    let (second, third) = tokio::join!(listing.go_to_page(2), listing.go_to_page(3));

    assert!(matches!(second, Err(ListingError::Aborted)));
    assert_eq!(third.unwrap().number("page"), Some(3));
    assert_eq!(keys(&listing), ["11", "12", "13", "14", "15"]);

    let events = events.lock();
    let applied: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ListingEvent::SearchParamsApplied { params, .. } => params.number("page"),
            _ => None,
        })
        .collect();
    assert_eq!(applied, [3]);
}

#[tokio::test]
async fn test_stream_paging_appends_and_trims() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(12))))
        .paged(paged(5, PagingMethod::Stream))
        .build()
        .unwrap();
    listing.load().await.unwrap();
    let events = record(&listing);

    assert!(listing.go_to_next_page().await.unwrap());
    assert_eq!(listing.item_count(), 10);
    assert_eq!(listing.paged().unwrap().rendered_pages(), 1..=2);

    assert!(listing.go_to_previous_page().await.unwrap());
    assert_eq!(keys(&listing), ["1", "2", "3", "4", "5"]);
    assert_eq!(listing.paged().unwrap().rendered_pages(), 1..=1);

    let events = events.lock();
    let removed: Vec<&ListingEvent> = events
        .iter()
        .filter(|event| matches!(event, ListingEvent::ItemsRemoved { .. }))
        .collect();
    assert_eq!(removed.len(), 1);
    assert_eq!(
        removed[0],
        &ListingEvent::ItemsRemoved {
            keys: ["6", "7", "8", "9", "10"].into_iter().map(ItemKey::from).collect()
        }
    );
}

#[tokio::test]
async fn test_stream_plan_depends_on_direction() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(30))))
        .paged(paged(5, PagingMethod::Stream))
        .build()
        .unwrap();
    listing.load().await.unwrap();

    let requested = Arc::new(Mutex::new(Vec::new()));
    let sink = requested.clone();
    let paged = listing.paged().unwrap().clone();
    listing.events().connect(move |event: &ListingEvent| {
        if let ListingEvent::RequestParams { params, .. } = event {
            sink.lock().push(params.number("page"));
        }
    });

    listing.go_to_page(2).await.unwrap();
    listing.go_to_page(5).await.unwrap();
    assert_eq!(keys(&listing), ["21", "22", "23", "24", "25"]);
    assert_eq!(paged.rendered_pages(), 5..=5);
    assert_eq!(*requested.lock(), [Some(2), Some(5)]);
}

#[tokio::test]
async fn test_scroll_loading_until_hidden() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(20))))
        .paged(PagedConfig {
            scroll_loading: true,
            ..paged(5, PagingMethod::Stream)
        })
        .build()
        .unwrap();
    listing.load().await.unwrap();

    let loaded = listing
        .on_sentinel_visible(|listing| listing.item_count() < 12)
        .await
        .unwrap();
    assert_eq!(loaded, 2);
    assert_eq!(listing.item_count(), 15);
}

#[tokio::test]
async fn test_scroll_loading_needs_stream() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(20))))
        .paged(PagedConfig {
            scroll_loading: true,
            ..paged(5, PagingMethod::Regular)
        })
        .build()
        .unwrap();
    listing.load().await.unwrap();

    assert_eq!(listing.on_sentinel_visible(|_| true).await.unwrap(), 0);
    assert_eq!(listing.paged().unwrap().paging().page(), 1);
}

#[tokio::test]
async fn test_search_switches_to_relevance_and_back() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(12))))
        .sorted(SortedConfig::default())
        .searchable(SearchableConfig {
            relevance_key: Some("score".to_string()),
            ..SearchableConfig::default()
        })
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();

    listing.set_sort(Some("name"), SortOrder::Asc).await.unwrap();
    listing.go_to_page(2).await.unwrap();

    let applied = listing.search("person 1").await.unwrap();
    assert_eq!(applied.text("sort"), Some("score"));
    assert_eq!(applied.text("order"), Some("desc"));
    assert_eq!(applied.number("page"), Some(1));
    assert_eq!(keys(&listing), ["12", "11", "10"]);

    let applied = listing.search("").await.unwrap();
    assert!(!applied.get("search").is_set());
    assert_eq!(applied.text("sort"), Some("name"));
    assert_eq!(applied.text("order"), Some("asc"));
    assert_eq!(listing.sorted().unwrap().active_sort().as_deref(), Some("name"));
}

#[tokio::test]
async fn test_explicit_sort_during_pending_search() {
    init_tracing();
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(12))))
        .sorted(SortedConfig::default())
        .searchable(SearchableConfig {
            relevance_key: Some("score".to_string()),
            ..SearchableConfig::default()
        })
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();

    let (searched, sorted) = tokio::join!(
        listing.search("person"),
        listing.set_sort(Some("name"), SortOrder::Desc)
    );

    assert!(matches!(searched, Err(ListingError::Aborted)));
    let applied = sorted.unwrap();
    assert_eq!(applied.text("search"), Some("person"));
    assert_eq!(applied.text("sort"), Some("name"));
    assert_eq!(applied.text("order"), Some("desc"));
    assert_eq!(listing.search_params(), applied);
    assert_eq!(keys(&listing), ["12", "11", "10", "9", "8"]);

    // The user left relevance ordering, so clearing keeps their sort.
    let cleared = listing.search("").await.unwrap();
    assert_eq!(cleared.text("sort"), Some("name"));
    assert_eq!(cleared.text("order"), Some("desc"));
}

#[tokio::test]
async fn test_request_matching_pending_waits_for_it() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(12))))
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();
    let events = record(&listing);

    let (first, second) = tokio::join!(listing.go_to_page(3), listing.go_to_page(3));

    let first = first.unwrap();
    assert_eq!(first.number("page"), Some(3));
    assert_eq!(second.unwrap(), first);
    let requests = events
        .lock()
        .iter()
        .filter(|event| matches!(event, ListingEvent::RequestParams { .. }))
        .count();
    assert_eq!(requests, 1);
}

#[tokio::test]
async fn test_sort_without_order_defaults_to_ascending() {
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(3))))
        .sorted(SortedConfig::default())
        .build()
        .unwrap();
    listing.load().await.unwrap();

    let applied = listing
        .set_search_params(
            SearchParams::new().with("sort", "score"),
            SetParamsOptions::from_origin(Origin::Sort),
        )
        .await
        .unwrap();
    assert_eq!(applied.text("order"), Some("asc"));

    listing.sort_by_column("score").await.unwrap();
    assert_eq!(keys(&listing), ["3", "2", "1"]);
}

#[tokio::test]
async fn test_store_delete_prunes_selection() {
    let store = Arc::new(people(3));
    let listing = ListingBuilder::new("people", StoreSource::new(store.clone()))
        .selectable()
        .build()
        .unwrap();
    listing.load().await.unwrap();
    let events = record(&listing);

    let selectable = listing.selectable().unwrap();
    selectable.select(&"1".into());
    selectable.select(&"2".into());
    assert!(!selectable.select(&"9".into()));

    assert!(store.delete(&"1".into()));
    assert_eq!(listing.process_store_events().await.unwrap(), 1);

    assert_eq!(keys(&listing), ["2", "3"]);
    assert_eq!(selectable.selected_keys(), [ItemKey::from("2")]);
    let last_selection = events.lock().iter().rev().find_map(|event| match event {
        ListingEvent::SelectionChanged(count) => Some(*count),
        _ => None,
    });
    let count = last_selection.unwrap();
    assert_eq!((count.old_count, count.new_count), (2, 1));
}

#[tokio::test]
async fn test_store_add_inside_window() {
    let store = Arc::new(people(3));
    let listing = ListingBuilder::new("people", StoreSource::new(store.clone()))
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();

    store.add(4i64, json!({ "name": "person 04" }));
    store.insert(0, 0i64, json!({ "name": "person 00" }));
    listing.process_store_events().await.unwrap();

    assert_eq!(keys(&listing), ["0", "1", "2", "3", "4"]);
    assert_eq!(listing.paged().unwrap().paging().total(), 5);

    store.add(5i64, json!({ "name": "person 05" }));
    listing.process_store_events().await.unwrap();
    assert_eq!(listing.item_count(), 5);
    assert_eq!(listing.paged().unwrap().paging().page_count(), 2);
}

#[tokio::test]
async fn test_store_add_before_window_reloads() {
    init_tracing();
    let store = Arc::new(people(12));
    let listing = ListingBuilder::new("people", StoreSource::new(store.clone()))
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();
    listing.go_to_page(2).await.unwrap();

    store.insert(0, 0i64, json!({ "name": "person 00" }));
    listing.process_store_events().await.unwrap();

    assert_eq!(keys(&listing), ["5", "6", "7", "8", "9"]);
    assert_eq!(listing.paged().unwrap().paging().total(), 13);
}

#[tokio::test]
async fn test_store_changes_under_search_reload() {
    let store = Arc::new(MemoryStore::from_entries((1..=3i64).map(|i| {
        (ItemKey::from(i), json!({ "name": format!("ada {i}") }))
    })));
    let listing = ListingBuilder::new("people", StoreSource::new(store.clone()))
        .searchable(SearchableConfig::default())
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();
    listing.search("ada").await.unwrap();

    store.add("zz", json!({ "name": "bob" }));
    listing.process_store_events().await.unwrap();
    assert_eq!(keys(&listing), ["1", "2", "3"]);
    assert_eq!(listing.paged().unwrap().paging().total(), 3);

    store.insert(0, "0", json!({ "name": "ada 0" }));
    listing.process_store_events().await.unwrap();
    assert_eq!(keys(&listing), ["0", "1", "2", "3"]);

    assert!(store.delete(&"1".into()));
    listing.process_store_events().await.unwrap();
    assert_eq!(keys(&listing), ["0", "2", "3"]);
    assert_eq!(listing.paged().unwrap().paging().total(), 3);
}

#[tokio::test]
async fn test_store_add_under_sort_reloads() {
    let store = Arc::new(people(3));
    let listing = ListingBuilder::new("people", StoreSource::new(store.clone()))
        .sorted(SortedConfig::default())
        .build()
        .unwrap();
    listing.load().await.unwrap();
    listing.set_sort(Some("score"), SortOrder::Desc).await.unwrap();

    store.add(9i64, json!({ "name": "person 09", "score": 9 }));
    listing.process_store_events().await.unwrap();
    assert_eq!(keys(&listing), ["9", "3", "2", "1"]);
}

#[tokio::test]
async fn test_store_delete_across_pages_reloads() {
    let store = Arc::new(people(12));
    let listing = ListingBuilder::new("people", StoreSource::new(store.clone()))
        .paged(paged(5, PagingMethod::Regular))
        .build()
        .unwrap();
    listing.load().await.unwrap();

    store.delete_many(&["2".into(), "3".into()]);
    listing.process_store_events().await.unwrap();

    assert_eq!(keys(&listing), ["1", "4", "5", "6", "7"]);
    assert_eq!(listing.paged().unwrap().paging().total(), 10);
}

#[tokio::test]
async fn test_missing_keys_are_removed() {
    let store = Arc::new(people(3));
    let listing = ListingBuilder::new("people", StoreSource::new(store.clone()))
        .build()
        .unwrap();
    listing.load().await.unwrap();

    listing
        .apply_store_event(StoreEvent::DeleteNotFound {
            keys: vec!["3".into()],
            total: 2,
        })
        .await
        .unwrap();
    assert_eq!(keys(&listing), ["1", "2"]);
}

#[tokio::test]
async fn test_listing_from_toml_config() {
    let config = ListingConfig::from_toml_str(
        r#"
        selectable = true

        [paging]
        per_page = 4

        [search]
        "#,
    )
    .unwrap();
    let listing = ListingBuilder::new("people", StoreSource::new(Arc::new(people(9))))
        .with_config(config)
        .build()
        .unwrap();
    listing.load().await.unwrap();

    assert!(listing.selectable().is_some());
    assert!(listing.sorted().is_none());
    assert_eq!(listing.item_count(), 4);
    assert!(listing.searchable().unwrap().is_input_enabled());

    listing.search("person 09").await.unwrap();
    assert_eq!(keys(&listing), ["9"]);
}

#[tokio::test]
async fn test_renamed_params_reach_store() {
    let config = ListingConfig::from_toml_str(
        r#"
        [paging]
        page_param = "p"
        per_page_param = "n"
        per_page = 2

        [sorting]
        sort_param = "by"
        order_param = "dir"

        [search]
        param = "q"
        sort_param = "by"
        order_param = "dir"
        page_param = "p"
        "#,
    )
    .unwrap();
    let store = Arc::new(people(12).with_params(MemoryStoreParams::from_config(&config)));
    assert_eq!(store.params().search, "q");
    let listing = ListingBuilder::new("people", StoreSource::new(store))
        .with_config(config)
        .build()
        .unwrap();
    listing.load().await.unwrap();
    assert_eq!(keys(&listing), ["1", "2"]);
    assert_eq!(listing.paged().unwrap().paging().total(), 12);

    listing.search("person 1").await.unwrap();
    assert_eq!(listing.paged().unwrap().paging().total(), 3);

    listing.set_sort(Some("score"), SortOrder::Desc).await.unwrap();
    assert_eq!(keys(&listing), ["12", "11"]);

    let applied = listing.go_to_page(2).await.unwrap();
    assert_eq!(applied.number("p"), Some(2));
    assert_eq!(keys(&listing), ["10"]);
}
