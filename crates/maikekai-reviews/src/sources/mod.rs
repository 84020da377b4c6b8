//! Review source abstractions.
//!
//! The aggregator only sees these two traits. The persisted store lives
//! behind [`ReviewStore`] so this crate carries no database dependency; the
//! provider lives behind [`ExternalReviewSource`] so tests can swap in fakes.

mod places;
mod places_upstream;

pub use places::PlacesProxyClient;
pub use places_upstream::PlacesUpstreamClient;

use std::future::Future;

use maikekai_core::{ExternalReview, PersistedReviewRow};

use crate::error::ReviewsError;

/// Persisted reviews owned by the site's own database.
pub trait ReviewStore: Send + Sync + 'static {
    /// Fetch public reviews joined with their author profile, newest first.
    fn fetch_public_reviews(
        &self,
    ) -> impl Future<Output = Result<Vec<PersistedReviewRow>, ReviewsError>> + Send;
}

/// Third-party review provider keyed by place id.
pub trait ExternalReviewSource: Send + Sync + 'static {
    fn fetch_place_reviews(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<Vec<ExternalReview>, ReviewsError>> + Send;
}

/// Normalise a base URL so it ends with exactly one slash and `Url::join`
/// appends to the path instead of replacing the last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<reqwest::Url, ReviewsError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    reqwest::Url::parse(&normalised).map_err(|e| ReviewsError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn build_http_client(
    timeout: std::time::Duration,
) -> Result<reqwest::Client, ReviewsError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(std::time::Duration::from_secs(10))
        .user_agent("maikekai/0.1 (review-aggregator)")
        .build()?)
}
