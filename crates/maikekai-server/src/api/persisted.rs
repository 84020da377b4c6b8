//! Persisted-store-only review routes, served straight from Postgres.
//!
//! These bypass the aggregator and its cache: an exact-rating listing and a
//! database-side rating summary.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use maikekai_core::{AggregateStats, PersistedReviewRow, Review};
use maikekai_reviews::normalize_persisted;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct PersistedQuery {
    pub rating: Option<i64>,
}

pub(super) async fn list_persisted_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PersistedQuery>,
) -> Result<Json<ApiResponse<Vec<Review>>>, ApiError> {
    let rating = parse_rating(query.rating)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    let rows = match rating {
        Some(rating) => maikekai_db::list_public_reviews_by_rating(&state.pool, rating).await,
        None => maikekai_db::list_public_reviews(&state.pool).await,
    }
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let reviews = normalize_persisted(rows.into_iter().map(PersistedReviewRow::from).collect());
    Ok(Json(ApiResponse {
        data: reviews,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_persisted_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<AggregateStats>>, ApiError> {
    let summary = maikekai_db::public_review_rating_summary(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: summary.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn parse_rating(rating: Option<i64>) -> Result<Option<i32>, String> {
    rating
        .map(|r| {
            i32::try_from(r)
                .ok()
                .filter(|r| (1..=5).contains(r))
                .ok_or_else(|| format!("rating must be between 1 and 5, got {r}"))
        })
        .transpose()
}
