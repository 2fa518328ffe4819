mod common;

use std::sync::atomic::Ordering;

use common::{FakeOverpass, FakePlaces, osm_node, place, shared_state};
use nearby_eats::models::{FoodCategory, ProviderMode, SearchQuery};
use nearby_eats::services::{ProviderError, SearchError};

const NYC: (f64, f64) = (40.7128, -74.0060);

#[tokio::test]
async fn test_google_results_without_food_types_are_filtered() {
    let mut results: Vec<_> = (0..10)
        .map(|i| {
            place(
                &format!("Diner {i}"),
                NYC.0 + f64::from(i) * 0.001,
                NYC.1,
                &["restaurant", "food"],
            )
        })
        .collect();
    results.push(place("Corner Gas", NYC.0 + 0.02, NYC.1, &["gas_station"]));
    results.push(place("City Bank", NYC.0 + 0.03, NYC.1, &["bank", "finance"]));

    let places = FakePlaces::returning(results);
    let state = shared_state(
        ProviderMode::Google,
        Some(places.clone()),
        FakeOverpass::returning(vec![]),
    );

    let query = SearchQuery::at(NYC.0, NYC.1).with_categories(vec![FoodCategory::Restaurant]);
    let outcome = state.search_service.search(&query).await.unwrap();

    assert_eq!(outcome.restaurants.len(), 10);
    assert_eq!(outcome.stats.google_results_raw, 12);
    assert_eq!(outcome.stats.google_results_filtered, 10);
    assert_eq!(outcome.stats.google_search_queries, 1);
    assert!(!outcome.stats.cached_result);
    assert!(
        outcome
            .restaurants
            .iter()
            .all(|r| r.name != "Corner Gas" && r.name != "City Bank")
    );
    assert_eq!(places.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_both_mode_merges_same_place_from_each_provider() {
    let places = FakePlaces::returning(vec![place(
        "Joe's Pizza",
        40.71280,
        -74.00600,
        &["restaurant"],
    )]);
    let overpass = FakeOverpass::returning(vec![osm_node(
        1,
        "joe's pizza",
        40.71283,
        -74.00601,
        "restaurant",
    )]);
    let state = shared_state(ProviderMode::Both, Some(places), overpass);

    let query = SearchQuery::at(NYC.0, NYC.1).with_categories(vec![FoodCategory::Restaurant]);
    let outcome = state.search_service.search(&query).await.unwrap();

    assert_eq!(outcome.restaurants.len(), 1);
    assert_eq!(outcome.restaurants[0].name, "[GOOGLE] Joe's Pizza");
    assert_eq!(outcome.stats.total_before_dedup, 2);
    assert_eq!(outcome.stats.total_after_dedup, 1);
    assert_eq!(outcome.stats.osm_results_total, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fan_out_timeouts_report_every_source() {
    let places = FakePlaces::hanging();
    let state = shared_state(
        ProviderMode::Google,
        Some(places.clone()),
        FakeOverpass::returning(vec![]),
    );

    let query = SearchQuery::at(NYC.0, NYC.1);
    let err = state.search_service.search(&query).await.unwrap_err();

    let SearchError::Provider(ProviderError::AllFailed { failures }) = err else {
        panic!("expected a combined fan-out failure, got {err:?}");
    };

    let calls = places.calls.load(Ordering::SeqCst);
    assert_eq!(failures.len(), calls);
    for source in ["restaurant", "cafe", "bakery", "cuisine:thai", "text:food"] {
        assert!(
            failures.iter().any(|f| f.starts_with(&format!("{source}: "))),
            "missing {source} in {failures:?}"
        );
    }
    assert!(failures.iter().all(|f| f.contains("timed out")));
}

#[tokio::test]
async fn test_osm_mode_never_touches_google() {
    let places = FakePlaces::returning(vec![place("Unused", NYC.0, NYC.1, &["restaurant"])]);
    let overpass = FakeOverpass::returning(vec![
        osm_node(1, "Bagel Stop", 40.7130, -74.0061, "cafe"),
        osm_node(2, "Night Owl", 40.7140, -74.0070, "bar"),
    ]);
    let state = shared_state(ProviderMode::Osm, Some(places.clone()), overpass);

    let outcome = state
        .search_service
        .search(&SearchQuery::at(NYC.0, NYC.1))
        .await
        .unwrap();

    assert_eq!(outcome.restaurants.len(), 2);
    assert_eq!(outcome.restaurants[0].name, "Bagel Stop");
    assert_eq!(places.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_both_mode_reports_each_failed_provider() {
    let state = shared_state(
        ProviderMode::Both,
        Some(FakePlaces::failing()),
        FakeOverpass::failing(),
    );

    let query = SearchQuery::at(NYC.0, NYC.1).with_categories(vec![FoodCategory::Cafe]);
    match state.search_service.search(&query).await {
        Err(SearchError::AllProvidersFailed { failures }) => {
            assert_eq!(failures.len(), 2);
            assert!(failures[0].starts_with("google: "));
            assert!(failures[1].starts_with("osm: "));
        }
        other => panic!("expected both providers to fail, got {other:?}"),
    }
}

#[tokio::test]
async fn test_second_search_nearby_is_served_from_cache() {
    let overpass = FakeOverpass::returning(vec![osm_node(
        7,
        "Harbor Fish",
        40.7129,
        -74.0059,
        "restaurant",
    )]);
    let state = shared_state(ProviderMode::Osm, None, overpass.clone());

    let first = state
        .search_service
        .search(&SearchQuery::at(NYC.0, NYC.1))
        .await
        .unwrap();
    assert!(!first.stats.cached_result);

    // about 11 m north, inside the match radius
    let second = state
        .search_service
        .search(&SearchQuery::at(NYC.0 + 0.0001, NYC.1))
        .await
        .unwrap();

    assert!(second.stats.cached_result);
    assert_eq!(second.restaurants, first.restaurants);
    assert_eq!(overpass.calls.load(Ordering::SeqCst), 1);

    let keyword = SearchQuery::at(NYC.0, NYC.1).with_keyword("fish");
    let third = state.search_service.search(&keyword).await.unwrap();
    assert!(!third.stats.cached_result);
    assert_eq!(overpass.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_google_fan_out_keeps_pre_dedup_count() {
    let places = FakePlaces::returning(vec![place("Joe's", 40.7130, -74.0061, &["cafe", "bar"])]);
    let state = shared_state(
        ProviderMode::Google,
        Some(places.clone()),
        FakeOverpass::returning(vec![]),
    );

    let query = SearchQuery::at(NYC.0, NYC.1)
        .with_categories(vec![FoodCategory::Cafe, FoodCategory::Bar]);
    let outcome = state.search_service.search(&query).await.unwrap();

    assert_eq!(places.calls.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.restaurants.len(), 1);
    assert_eq!(outcome.stats.google_search_queries, 2);
    assert_eq!(outcome.stats.total_before_dedup, 2);
    assert_eq!(outcome.stats.total_after_dedup, 1);
}
