use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The places provider answered with a non-`OK` status.
    #[error("places API error: {0}")]
    Upstream(String),

    /// The credential-injecting proxy answered with an error body.
    #[error("reviews proxy error ({status}): {message}")]
    Proxy { status: u16, message: String },

    /// A value the source needs before any fetch is attempted is not configured.
    #[error("{0} is not configured")]
    MissingConfig(&'static str),

    #[error("persisted store error: {0}")]
    Store(String),

    #[error("carousel interval must be non-zero")]
    ZeroInterval,

    #[error("carousel has been disposed")]
    CarouselClosed,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
