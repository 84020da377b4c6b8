//! Merge normalized reviews from both sources into one ordered sequence.

use std::collections::HashSet;

use maikekai_core::Review;

use crate::fallback::sample_reviews;

/// Result of a merge that substitutes the sample set for an empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedReviews {
    pub reviews: Vec<Review>,
    /// `true` when neither source contributed a review and `reviews` holds
    /// the sample set.
    pub fallback: bool,
}

/// Concatenate both sources and order newest first.
///
/// Equal timestamps are ordered persisted before external; remaining ties
/// keep their input order. A repeated id keeps its first occurrence. No
/// cross-source identity matching is attempted, so the same physical review
/// arriving from both sources appears twice.
#[must_use]
pub fn merge_reviews(persisted: Vec<Review>, external: Vec<Review>) -> Vec<Review> {
    let mut merged = persisted;
    merged.extend(external);

    let mut seen_ids: HashSet<String> = HashSet::with_capacity(merged.len());
    merged.retain(|review| seen_ids.insert(review.id.clone()));

    merged.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.source.cmp(&b.source))
    });
    merged
}

/// [`merge_reviews`], falling back to the sample set when both sources are empty.
#[must_use]
pub fn merge_with_fallback(persisted: Vec<Review>, external: Vec<Review>) -> MergedReviews {
    let reviews = merge_reviews(persisted, external);
    if reviews.is_empty() {
        return MergedReviews {
            reviews: sample_reviews(),
            fallback: true,
        };
    }
    MergedReviews {
        reviews,
        fallback: false,
    }
}
