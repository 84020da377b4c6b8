use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;

use super::*;
use crate::test_support::{external_review, persisted_row, FakeExternal, FakeStore};

fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, n, 9, 0, 0).unwrap()
}

fn aggregator(
    store: FakeStore,
    external: FakeExternal,
) -> ReviewAggregator<FakeStore, FakeExternal> {
    ReviewAggregator::new(
        store,
        external,
        Arc::new(ReviewCache::default()),
        Some("place-1".to_string()),
    )
}

#[tokio::test]
async fn merges_both_sources_newest_first_and_drops_invalid() {
    let agg = aggregator(
        FakeStore::with_rows(vec![persisted_row("a1", day(3), 5)]),
        FakeExternal::with_reviews(vec![
            external_review("Bea", day(5).timestamp(), 4),
            external_review("Bo", day(1).timestamp(), 7),
        ]),
    );

    let outcome = agg.load().await;

    assert!(!outcome.fallback);
    assert!(outcome.unavailable.is_empty());
    assert_eq!(outcome.reviews.len(), 2);
    assert_eq!(outcome.reviews[0].author_name, "Bea");
    assert_eq!(outcome.reviews[0].source, ReviewSource::External);
    assert_eq!(outcome.reviews[1].id, "a1");
    assert_eq!(outcome.stats.average_rating, Decimal::new(45, 1));
    assert_eq!(outcome.stats.total_count, 2);
}

#[tokio::test]
async fn failing_store_degrades_to_external_only() {
    let agg = aggregator(
        FakeStore::failing(),
        FakeExternal::with_reviews(vec![external_review("Bea", day(5).timestamp(), 5)]),
    );

    let outcome = agg.load().await;

    assert!(!outcome.fallback);
    assert_eq!(outcome.reviews.len(), 1);
    assert_eq!(outcome.unavailable.len(), 1);
    assert_eq!(outcome.unavailable[0].source, ReviewSource::Persisted);
    assert!(outcome.unavailable[0].reason.contains("connection refused"));
}

#[tokio::test]
async fn both_sources_failing_serves_sample_set() {
    let agg = aggregator(FakeStore::failing(), FakeExternal::failing());

    let outcome = agg.load().await;

    assert!(outcome.fallback);
    assert_eq!(outcome.reviews, crate::fallback::sample_reviews());
    assert_eq!(outcome.stats.total_count, outcome.reviews.len());
    assert_eq!(outcome.unavailable.len(), 2);
}

#[tokio::test]
async fn missing_place_id_marks_external_unavailable_without_fetching() {
    let agg = ReviewAggregator::new(
        FakeStore::with_rows(vec![persisted_row("a1", day(3), 4)]),
        FakeExternal::default(),
        Arc::new(ReviewCache::default()),
        None,
    );

    let outcome = agg.load().await;

    assert_eq!(outcome.reviews.len(), 1);
    assert_eq!(outcome.unavailable.len(), 1);
    assert_eq!(outcome.unavailable[0].source, ReviewSource::External);
    assert!(outcome.unavailable[0].reason.contains("GOOGLE_PLACE_ID"));
    assert_eq!(agg.external.calls(), 0);
}

#[tokio::test]
async fn second_load_is_served_from_cache() {
    let agg = aggregator(
        FakeStore::with_rows(vec![persisted_row("a1", day(3), 5)]),
        FakeExternal::with_reviews(vec![external_review("Bea", day(5).timestamp(), 4)]),
    );

    let first = agg.load().await;
    let second = agg.load().await;

    assert_eq!(first, second);
    assert_eq!(agg.store.calls(), 1);
    assert_eq!(agg.external.calls(), 1);
}

#[tokio::test]
async fn refresh_bypasses_cache() {
    let agg = aggregator(
        FakeStore::with_rows(vec![persisted_row("a1", day(3), 5)]),
        FakeExternal::with_reviews(vec![]),
    );

    agg.load().await;
    agg.refresh().await;

    assert_eq!(agg.store.calls(), 2);
    assert_eq!(agg.external.calls(), 2);
}

#[tokio::test]
async fn failed_source_is_not_cached() {
    let agg = aggregator(FakeStore::failing(), FakeExternal::with_reviews(vec![]));

    agg.load().await;
    agg.load().await;

    assert_eq!(agg.store.calls(), 2);
    assert_eq!(agg.external.calls(), 1);
}
