use axum::{
    extract::{Query, State},
    Extension, Json,
};
use maikekai_core::{AggregateStats, Review, ReviewSource};
use maikekai_reviews::{ReviewFilter, SourceFailure};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ReviewsQuery {
    pub source: Option<String>,
    pub min_rating: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ReviewsData {
    reviews: Vec<Review>,
    /// Computed over the merged set, before the query filter.
    stats: AggregateStats,
    fallback: bool,
    unavailable: Vec<SourceFailure>,
}

pub(super) async fn list_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<ApiResponse<ReviewsData>>, ApiError> {
    let filter = parse_filter(&query)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    let outcome = state.aggregator.load().await;
    let data = ReviewsData {
        reviews: filter.apply(&outcome.reviews),
        stats: outcome.stats,
        fallback: outcome.fallback,
        unavailable: outcome.unavailable,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_review_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<AggregateStats>> {
    let outcome = state.aggregator.load().await;
    Json(ApiResponse {
        data: outcome.stats,
        meta: ResponseMeta::new(req_id.0),
    })
}

#[derive(Debug, Serialize)]
pub(super) struct FeaturedData {
    review: Option<Review>,
    index: Option<usize>,
    total: usize,
    auto_advance: bool,
    fallback: bool,
    loading: bool,
}

/// The review the shared carousel is showing right now.
pub(super) async fn get_featured_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<FeaturedData>> {
    let snapshot = state.carousel.snapshot();
    Json(ApiResponse {
        data: FeaturedData {
            total: snapshot.reviews.len(),
            review: snapshot.current,
            index: snapshot.current_index,
            auto_advance: snapshot.auto_advance,
            fallback: snapshot.fallback,
            loading: snapshot.loading,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

fn parse_filter(query: &ReviewsQuery) -> Result<ReviewFilter, String> {
    let source = query
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<ReviewSource>)
        .transpose()
        .map_err(|_| "source must be one of: persisted, external".to_string())?;

    let min_rating = query
        .min_rating
        .map(|rating| {
            u8::try_from(rating)
                .ok()
                .filter(|r| (1..=5).contains(r))
                .ok_or_else(|| format!("min_rating must be between 1 and 5, got {rating}"))
        })
        .transpose()?;

    Ok(ReviewFilter { source, min_rating })
}
