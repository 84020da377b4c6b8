//! Credential-injecting proxy for Google Places reviews.
//!
//! Browsers and the review aggregator call this route without a key; the
//! server attaches `GOOGLE_PLACES_API_KEY` and forwards to the provider.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use maikekai_core::PlaceDetails;
use maikekai_reviews::ReviewsError;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct PlaceQuery {
    pub place_id: Option<String>,
}

pub(super) async fn get_place_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PlaceQuery>,
) -> Result<Json<ApiResponse<PlaceDetails>>, ApiError> {
    let Some(place_id) = query
        .place_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        return Err(ApiError::new(req_id.0, "bad_request", "Place ID is required"));
    };

    let Some(places) = state.places.as_ref() else {
        tracing::error!("GOOGLE_PLACES_API_KEY is not configured");
        return Err(ApiError::new(
            req_id.0,
            "config_error",
            "Google Places API key not configured",
        ));
    };

    match places.fetch_place_details(place_id).await {
        Ok(details) => Ok(Json(ApiResponse {
            data: details,
            meta: ResponseMeta::new(req_id.0),
        })),
        Err(e) => {
            tracing::warn!(place_id, error = %e, "google places request failed");
            let message = match e {
                ReviewsError::Upstream(status) => format!("Google Places API error: {status}"),
                _ => "Failed to fetch Google reviews".to_string(),
            };
            Err(ApiError::new(req_id.0, "upstream_error", message))
        }
    }
}
