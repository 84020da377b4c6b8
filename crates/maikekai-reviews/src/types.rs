use std::time::Duration;

use maikekai_core::{AggregateStats, AppConfig, Review, ReviewSource};
use serde::{Deserialize, Serialize};

/// Settings the aggregator and carousel need from the application config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewsConfig {
    /// Provider place whose reviews are fetched. `None` marks the external
    /// source unavailable without failing the load.
    pub place_id: Option<String>,
    pub proxy_url: String,
    pub http_timeout: Duration,
    pub cache_ttl: Duration,
    pub carousel_interval: Duration,
}

impl ReviewsConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            place_id: config.google_place_id.clone(),
            proxy_url: config.reviews_proxy_url.clone(),
            http_timeout: Duration::from_secs(config.http_timeout_secs),
            cache_ttl: Duration::from_secs(config.review_cache_ttl_secs),
            carousel_interval: Duration::from_millis(config.carousel_interval_ms),
        }
    }
}

/// View filter applied over the merged review set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFilter {
    pub source: Option<ReviewSource>,
    /// Keep reviews rated at least this many stars.
    pub min_rating: Option<u8>,
}

impl ReviewFilter {
    #[must_use]
    pub fn matches(&self, review: &Review) -> bool {
        self.source.is_none_or(|source| review.source == source)
            && self.min_rating.is_none_or(|min| review.rating >= min)
    }

    #[must_use]
    pub fn apply(&self, reviews: &[Review]) -> Vec<Review> {
        reviews
            .iter()
            .filter(|review| self.matches(review))
            .cloned()
            .collect()
    }
}

/// A source that could not contribute to a load, with the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: ReviewSource,
    pub reason: String,
}

/// Everything one aggregation pass produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateOutcome {
    /// Merged reviews, newest first, or the sample set when `fallback` is set.
    pub reviews: Vec<Review>,
    pub stats: AggregateStats,
    pub fallback: bool,
    pub unavailable: Vec<SourceFailure>,
}
