//! Direct client for the Google Places details endpoint.
//!
//! Only the server's proxy endpoint uses this client, because it carries the
//! API key. Every response is checked for `"status": "OK"` before the
//! `result` object is deserialized.

use std::time::Duration;

use maikekai_core::PlaceDetails;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{build_http_client, parse_base_url};
use crate::error::ReviewsError;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const DETAILS_PATH: &str = "maps/api/place/details/json";
const DETAIL_FIELDS: &str = "place_id,name,rating,user_ratings_total,reviews";

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

pub struct PlacesUpstreamClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for PlacesUpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesUpstreamClient")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PlacesUpstreamClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// See [`PlacesUpstreamClient::with_base_url`].
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ReviewsError> {
        Self::with_base_url(api_key, timeout, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ReviewsError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ReviewsError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout: Duration,
        base_url: &str,
    ) -> Result<Self, ReviewsError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            api_key: api_key.to_owned(),
            base_url: parse_base_url(base_url)?,
        })
    }

    fn build_url(&self, place_id: &str) -> Result<Url, ReviewsError> {
        let mut url = self
            .base_url
            .join(DETAILS_PATH)
            .map_err(|e| ReviewsError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("fields", DETAIL_FIELDS)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Fetch place details with up to five provider reviews.
    ///
    /// # Errors
    ///
    /// - [`ReviewsError::Http`] on network failure or a non-2xx status.
    /// - [`ReviewsError::Upstream`] if `status` is anything but `"OK"` or the
    ///   response has no `result`.
    /// - [`ReviewsError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn fetch_place_details(&self, place_id: &str) -> Result<PlaceDetails, ReviewsError> {
        let url = self.build_url(place_id)?;
        // The URL carries the API key; keep it out of error messages and logs.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(reqwest::Error::without_url)?;
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        let parsed: DetailsResponse =
            serde_json::from_str(&body).map_err(|e| ReviewsError::Deserialize {
                context: format!("place/details(place_id={place_id})"),
                source: e,
            })?;

        if parsed.status != "OK" {
            let message = match parsed.error_message {
                Some(detail) => format!("{}: {detail}", parsed.status),
                None => parsed.status,
            };
            return Err(ReviewsError::Upstream(message));
        }

        parsed
            .result
            .ok_or_else(|| ReviewsError::Upstream("OK response without result".to_string()))
    }
}
