//! Two-source review aggregation.
//!
//! Fetches the persisted store and the provider concurrently, normalizes
//! each side, merges, and computes stats. A failing source is logged and
//! reported in [`AggregateOutcome::unavailable`]; it never fails the load.

use std::sync::Arc;

use chrono::Utc;
use maikekai_core::{Review, ReviewSource};

use crate::cache::ReviewCache;
use crate::error::ReviewsError;
use crate::merge::merge_with_fallback;
use crate::normalize::{normalize_external, normalize_persisted};
use crate::sources::{ExternalReviewSource, ReviewStore};
use crate::stats::compute_stats;
use crate::types::{AggregateOutcome, SourceFailure};

const PERSISTED_CACHE_KEY: &str = "reviews:persisted";

fn external_cache_key(place_id: &str) -> String {
    format!("reviews:external:{place_id}")
}

pub struct ReviewAggregator<S, E> {
    store: S,
    external: E,
    cache: Arc<ReviewCache<Vec<Review>>>,
    place_id: Option<String>,
}

impl<S, E> ReviewAggregator<S, E>
where
    S: ReviewStore,
    E: ExternalReviewSource,
{
    /// `place_id` of `None` leaves the external source permanently
    /// unavailable; loads still succeed with persisted reviews only.
    pub fn new(
        store: S,
        external: E,
        cache: Arc<ReviewCache<Vec<Review>>>,
        place_id: Option<String>,
    ) -> Self {
        Self {
            store,
            external,
            cache,
            place_id,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<ReviewCache<Vec<Review>>> {
        &self.cache
    }

    #[cfg(test)]
    pub(crate) fn store_for_test(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn external_for_test(&self) -> &E {
        &self.external
    }

    /// Run one aggregation pass, serving each source from cache when fresh.
    pub async fn load(&self) -> AggregateOutcome {
        let (persisted, external) = tokio::join!(self.load_persisted(), self.load_external());

        let mut unavailable = Vec::new();
        let persisted = settle(ReviewSource::Persisted, persisted, &mut unavailable);
        let external = settle(ReviewSource::External, external, &mut unavailable);

        let merged = merge_with_fallback(persisted, external);
        if merged.fallback {
            tracing::info!(
                unavailable = unavailable.len(),
                "no reviews from any source, serving sample set"
            );
        }
        let stats = compute_stats(&merged.reviews);

        AggregateOutcome {
            reviews: merged.reviews,
            stats,
            fallback: merged.fallback,
            unavailable,
        }
    }

    /// Drop cached source data so the next load hits both sources.
    pub async fn invalidate(&self) {
        self.cache.invalidate(PERSISTED_CACHE_KEY).await;
        if let Some(place_id) = &self.place_id {
            self.cache.invalidate(&external_cache_key(place_id)).await;
        }
    }

    /// [`Self::invalidate`] followed by [`Self::load`].
    pub async fn refresh(&self) -> AggregateOutcome {
        self.invalidate().await;
        self.load().await
    }

    async fn load_persisted(&self) -> Result<Vec<Review>, ReviewsError> {
        if let Some(cached) = self.cache.get(PERSISTED_CACHE_KEY).await {
            return Ok(cached);
        }
        let rows = self.store.fetch_public_reviews().await?;
        let reviews = normalize_persisted(rows);
        self.cache.set(PERSISTED_CACHE_KEY, reviews.clone()).await;
        Ok(reviews)
    }

    async fn load_external(&self) -> Result<Vec<Review>, ReviewsError> {
        let place_id = self
            .place_id
            .as_deref()
            .ok_or(ReviewsError::MissingConfig("GOOGLE_PLACE_ID"))?;
        let key = external_cache_key(place_id);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }
        let raw = self.external.fetch_place_reviews(place_id).await?;
        let reviews = normalize_external(raw, Utc::now());
        self.cache.set(key, reviews.clone()).await;
        Ok(reviews)
    }
}

fn settle(
    source: ReviewSource,
    result: Result<Vec<Review>, ReviewsError>,
    unavailable: &mut Vec<SourceFailure>,
) -> Vec<Review> {
    match result {
        Ok(reviews) => {
            tracing::debug!(source = %source, count = reviews.len(), "loaded reviews");
            reviews
        }
        Err(e) => {
            tracing::warn!(source = %source, error = %e, "review source unavailable");
            unavailable.push(SourceFailure {
                source,
                reason: e.to_string(),
            });
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;
