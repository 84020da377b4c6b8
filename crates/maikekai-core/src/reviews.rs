//! Canonical review model shared by the store, the aggregator and the server.
//!
//! Raw payloads ([`PersistedReviewRow`], [`ExternalReview`]) mirror what each
//! source hands back and carry no validation. [`Review`] is the only shape
//! the rest of the system consumes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a review came from.
///
/// Variant order is the merge tie-break precedence: persisted reviews sort
/// ahead of external ones when timestamps are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
    Persisted,
    External,
}

impl ReviewSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewSource::Persisted => "persisted",
            ReviewSource::External => "external",
        }
    }
}

impl std::fmt::Display for ReviewSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "persisted" => Ok(ReviewSource::Persisted),
            "external" => Ok(ReviewSource::External),
            other => Err(format!("unknown review source '{other}'")),
        }
    }
}

/// A normalized review, valid by construction once produced by a normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Unique within a merged set. Persisted and external ids never overlap.
    pub id: String,
    pub source: ReviewSource,
    pub author_name: String,
    pub author_country: Option<String>,
    /// First letter of the author name, uppercased, for avatar placeholders.
    pub avatar_initial: char,
    pub profile_photo_url: Option<String>,
    /// Always within `1..=5`.
    pub rating: u8,
    pub title: String,
    pub body_text: String,
    pub created_at: DateTime<Utc>,
    pub verified: bool,
    pub is_public: bool,
}

/// Summary statistics over a set of reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Mean rating rounded half-up to one decimal place; zero for no reviews.
    pub average_rating: Decimal,
    pub total_count: usize,
    /// `rating_counts[0]` holds one-star reviews, `rating_counts[4]` five-star.
    pub rating_counts: [usize; 5],
}

impl AggregateStats {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            average_rating: Decimal::ZERO,
            total_count: 0,
            rating_counts: [0; 5],
        }
    }
}

/// Minimal profile projection joined onto persisted reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileProjection {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
}

/// A review row as read from the persisted store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedReviewRow {
    pub id: String,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_verified: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub profile: Option<ProfileProjection>,
}

/// A review object as returned by the places provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalReview {
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
    #[serde(default)]
    pub rating: i64,
    #[serde(default)]
    pub relative_time_description: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Unix seconds. Absent in some payloads, in which case the relative
    /// description is the only time information.
    #[serde(default)]
    pub time: Option<i64>,
}

/// Place details with the bounded list of provider reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u64>,
    #[serde(default)]
    pub reviews: Vec<ExternalReview>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_sorts_before_external() {
        assert!(ReviewSource::Persisted < ReviewSource::External);
    }

    #[test]
    fn review_source_parses_case_insensitively() {
        assert_eq!(
            "Persisted".parse::<ReviewSource>().unwrap(),
            ReviewSource::Persisted
        );
        assert_eq!(
            " external ".parse::<ReviewSource>().unwrap(),
            ReviewSource::External
        );
        assert!("google".parse::<ReviewSource>().is_err());
    }

    #[test]
    fn review_source_serializes_lowercase() {
        let json = serde_json::to_string(&ReviewSource::External).expect("serialize");
        assert_eq!(json, "\"external\"");
    }

    #[test]
    fn place_details_tolerates_missing_reviews() {
        let details: PlaceDetails =
            serde_json::from_str(r#"{"place_id":"abc","name":"Maikekai"}"#).expect("parse");
        assert!(details.reviews.is_empty());
        assert!(details.rating.is_none());
    }

    #[test]
    fn external_review_parses_provider_shape() {
        let review: ExternalReview = serde_json::from_value(serde_json::json!({
            "author_name": "Carlos Silva",
            "language": "es",
            "rating": 5,
            "relative_time_description": "3 days ago",
            "text": "Perfecto!",
            "time": 1_700_000_000
        }))
        .expect("parse");
        assert_eq!(review.author_name.as_deref(), Some("Carlos Silva"));
        assert_eq!(review.rating, 5);
        assert_eq!(review.time, Some(1_700_000_000));
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = AggregateStats::empty();
        assert_eq!(stats.average_rating, Decimal::ZERO);
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.rating_counts, [0; 5]);
    }
}
