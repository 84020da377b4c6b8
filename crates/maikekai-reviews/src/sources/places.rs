//! Client for the credential-holding reviews proxy.
//!
//! The proxy is the server's own `GET /api/google-reviews` endpoint. It
//! attaches the provider API key server-side, so this client never holds a
//! credential. Successful responses are wrapped in the `{data, meta}`
//! envelope; failures carry `{error: {code, message}}`.

use std::time::Duration;

use maikekai_core::{ExternalReview, PlaceDetails};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{build_http_client, parse_base_url, ExternalReviewSource};
use crate::error::ReviewsError;

const PROXY_PATH: &str = "api/google-reviews";

#[derive(Debug, Deserialize)]
struct Envelope {
    data: PlaceDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct PlacesProxyClient {
    client: Client,
    base_url: Url,
}

impl PlacesProxyClient {
    /// # Errors
    ///
    /// Returns [`ReviewsError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ReviewsError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ReviewsError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    fn build_url(&self, place_id: &str) -> Result<Url, ReviewsError> {
        let mut url = self
            .base_url
            .join(PROXY_PATH)
            .map_err(|e| ReviewsError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("place_id", place_id);
        Ok(url)
    }

    /// Fetch place details through the proxy.
    ///
    /// # Errors
    ///
    /// - [`ReviewsError::Proxy`] when the proxy answers with a non-2xx status.
    /// - [`ReviewsError::Http`] on network failure or timeout.
    /// - [`ReviewsError::Deserialize`] if the body does not match the envelope.
    pub async fn fetch_place_details(&self, place_id: &str) -> Result<PlaceDetails, ReviewsError> {
        let url = self.build_url(place_id)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map_or_else(|_| body.clone(), |envelope| envelope.error.message);
            return Err(ReviewsError::Proxy {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| ReviewsError::Deserialize {
                context: format!("google-reviews(place_id={place_id})"),
                source: e,
            })?;
        Ok(envelope.data)
    }
}

impl ExternalReviewSource for PlacesProxyClient {
    async fn fetch_place_reviews(&self, place_id: &str) -> Result<Vec<ExternalReview>, ReviewsError> {
        Ok(self.fetch_place_details(place_id).await?.reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> PlacesProxyClient {
        PlacesProxyClient::new(base, Duration::from_secs(5)).expect("client should build")
    }

    #[test]
    fn build_url_appends_proxy_path_and_place_id() {
        let url = client("http://127.0.0.1:3000").build_url("ChIJ123").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:3000/api/google-reviews?place_id=ChIJ123"
        );
    }

    #[test]
    fn build_url_keeps_base_path_prefix() {
        let url = client("https://example.com/site/").build_url("abc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/site/api/google-reviews?place_id=abc"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = PlacesProxyClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ReviewsError::InvalidBaseUrl { .. }));
    }
}
