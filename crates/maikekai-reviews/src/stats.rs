//! Summary statistics over a review set.

use maikekai_core::{AggregateStats, Review};
use rust_decimal::{Decimal, RoundingStrategy};

/// Compute average rating, count and star distribution.
///
/// The average is rounded half-up to one decimal place. Ratings are positive
/// so `MidpointAwayFromZero` is exactly half-up; decimal arithmetic keeps
/// means like `4.45` from drifting below the midpoint.
#[must_use]
pub fn compute_stats(reviews: &[Review]) -> AggregateStats {
    if reviews.is_empty() {
        return AggregateStats::empty();
    }

    let mut rating_counts = [0usize; 5];
    let mut sum: u64 = 0;
    for review in reviews {
        sum += u64::from(review.rating);
        if let Some(slot) = usize::from(review.rating)
            .checked_sub(1)
            .and_then(|i| rating_counts.get_mut(i))
        {
            *slot += 1;
        }
    }

    let total_count = reviews.len();
    let mean = Decimal::from(sum) / Decimal::from(total_count);
    let average_rating = mean.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    AggregateStats {
        average_rating,
        total_count,
        rating_counts,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use maikekai_core::ReviewSource;

    use super::*;
    use crate::test_support::review;

    fn with_ratings(ratings: &[u8]) -> Vec<Review> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, r)| review(&format!("r{i}"), ReviewSource::Persisted, Utc::now(), *r))
            .collect()
    }

    #[test]
    fn empty_input_yields_zero_stats() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.average_rating, Decimal::ZERO);
        assert_eq!(stats.total_count, 0);
    }

    #[test]
    fn mean_of_four_point_seven_five_rounds_up() {
        let stats = compute_stats(&with_ratings(&[5, 5, 4, 5]));
        assert_eq!(stats.average_rating, Decimal::new(48, 1));
        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.rating_counts, [0, 0, 0, 1, 3]);
    }

    #[test]
    fn exact_midpoint_rounds_half_up() {
        // 89 / 20 = 4.45 exactly.
        let mut ratings = vec![5u8; 9];
        ratings.extend(vec![4u8; 11]);
        let stats = compute_stats(&with_ratings(&ratings));
        assert_eq!(stats.average_rating, Decimal::new(45, 1));
    }

    #[test]
    fn repeating_means_round_to_nearest() {
        // 13 / 3 = 4.333...
        let stats = compute_stats(&with_ratings(&[5, 4, 4]));
        assert_eq!(stats.average_rating, Decimal::new(43, 1));
        // 14 / 3 = 4.666...
        let stats = compute_stats(&with_ratings(&[5, 5, 4]));
        assert_eq!(stats.average_rating, Decimal::new(47, 1));
    }

    #[test]
    fn single_review_average_is_its_rating() {
        let stats = compute_stats(&with_ratings(&[1]));
        assert_eq!(stats.average_rating, Decimal::from(1));
        assert_eq!(stats.rating_counts, [1, 0, 0, 0, 0]);
    }
}
