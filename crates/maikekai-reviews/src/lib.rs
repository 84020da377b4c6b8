//! Review aggregation for the Maikekai surf hotel site.
//!
//! Pulls guest reviews from the site's own store and from the Google Places
//! provider, normalizes both into [`maikekai_core::Review`], merges them
//! newest first, computes summary stats, and drives the featured-review
//! carousel. Source failures degrade to fewer reviews or the sample set;
//! nothing here fails a page render.

pub mod aggregator;
pub mod cache;
pub mod carousel;
pub mod error;
pub mod fallback;
pub mod merge;
pub mod normalize;
pub mod rotation;
pub mod sources;
pub mod stats;
pub mod types;

#[cfg(test)]
mod test_support;

pub use aggregator::ReviewAggregator;
pub use cache::{ReviewCache, DEFAULT_TTL};
pub use carousel::{Carousel, CarouselCommand, CarouselSnapshot};
pub use error::ReviewsError;
pub use fallback::sample_reviews;
pub use merge::{merge_reviews, merge_with_fallback, MergedReviews};
pub use normalize::{
    country_from_language, derive_title, normalize_external, normalize_persisted,
    resolve_relative_time,
};
pub use rotation::RotationState;
pub use sources::{ExternalReviewSource, PlacesProxyClient, PlacesUpstreamClient, ReviewStore};
pub use stats::compute_stats;
pub use types::{AggregateOutcome, ReviewFilter, ReviewsConfig, SourceFailure};
