//! Read-only queries against the persisted review store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use maikekai_core::{AggregateStats, PersistedReviewRow, ProfileProjection};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A public review joined with the author's profile projection.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublicReviewRow {
    pub id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_verified: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub profile_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
}

impl From<PublicReviewRow> for PersistedReviewRow {
    fn from(row: PublicReviewRow) -> Self {
        let profile = row.profile_id.map(|_| ProfileProjection {
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            country: row.country,
        });

        Self {
            id: row.id.to_string(),
            rating: row.rating,
            title: row.title,
            comment: row.comment,
            is_verified: row.is_verified,
            is_public: row.is_public,
            created_at: row.created_at,
            profile,
        }
    }
}

/// Database-side rating summary over the public reviews.
///
/// Counts only rows the persisted normalizer would keep: rating in `1..=5`
/// and a non-blank comment.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RatingSummaryRow {
    pub total_count: i64,
    /// Rounded by Postgres `ROUND(numeric, 1)`, which rounds half away from zero.
    pub average_rating: Decimal,
    pub one_star: i64,
    pub two_star: i64,
    pub three_star: i64,
    pub four_star: i64,
    pub five_star: i64,
}

impl From<RatingSummaryRow> for AggregateStats {
    fn from(row: RatingSummaryRow) -> Self {
        let count = |n: i64| usize::try_from(n).unwrap_or(0);
        Self {
            average_rating: row.average_rating,
            total_count: count(row.total_count),
            rating_counts: [
                count(row.one_star),
                count(row.two_star),
                count(row.three_star),
                count(row.four_star),
                count(row.five_star),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

const PUBLIC_REVIEW_COLUMNS: &str = "r.id, r.rating, r.title, r.comment, r.is_verified, \
     r.is_public, r.created_at, p.id AS profile_id, p.full_name, p.avatar_url, p.country";

/// List every public review, newest first, with its author profile.
///
/// Results are ordered by `created_at DESC` then `id DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_public_reviews(pool: &PgPool) -> Result<Vec<PublicReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, PublicReviewRow>(&format!(
        "SELECT {PUBLIC_REVIEW_COLUMNS} \
         FROM reviews r \
         LEFT JOIN profiles p ON p.id = r.user_id \
         WHERE r.is_public = true \
         ORDER BY r.created_at DESC, r.id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List public reviews with exactly `rating` stars, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_public_reviews_by_rating(
    pool: &PgPool,
    rating: i32,
) -> Result<Vec<PublicReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, PublicReviewRow>(&format!(
        "SELECT {PUBLIC_REVIEW_COLUMNS} \
         FROM reviews r \
         LEFT JOIN profiles p ON p.id = r.user_id \
         WHERE r.is_public = true AND r.rating = $1 \
         ORDER BY r.created_at DESC, r.id DESC"
    ))
    .bind(rating)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count, one-decimal average and star distribution of the public reviews,
/// computed in one aggregate query.
///
/// An empty table yields a zero count and a `0` average.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn public_review_rating_summary(pool: &PgPool) -> Result<RatingSummaryRow, DbError> {
    let row = sqlx::query_as::<_, RatingSummaryRow>(
        "SELECT COUNT(*) AS total_count, \
                COALESCE(ROUND(AVG(rating)::numeric, 1), 0) AS average_rating, \
                COUNT(*) FILTER (WHERE rating = 1) AS one_star, \
                COUNT(*) FILTER (WHERE rating = 2) AS two_star, \
                COUNT(*) FILTER (WHERE rating = 3) AS three_star, \
                COUNT(*) FILTER (WHERE rating = 4) AS four_star, \
                COUNT(*) FILTER (WHERE rating = 5) AS five_star \
         FROM reviews \
         WHERE is_public = true \
           AND rating BETWEEN 1 AND 5 \
           AND btrim(COALESCE(comment, '')) <> ''",
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}
