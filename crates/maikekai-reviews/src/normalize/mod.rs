//! Source normalizers: raw store rows and provider reviews into [`Review`].
//!
//! Invalid records (blank body, rating outside `1..=5`, non-public, no
//! resolvable timestamp) are dropped. Dropping is logged at debug level and
//! never surfaced; partial review data must not block rendering.

mod country;
mod relative_time;

pub use country::country_from_language;
pub use relative_time::resolve_relative_time;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use maikekai_core::{ExternalReview, PersistedReviewRow, Review, ReviewSource};
use sha2::{Digest, Sha256};

/// Character budget for titles derived from review bodies.
pub const TITLE_CHAR_BUDGET: usize = 100;
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";
const TITLE_ELLIPSIS: &str = "...";

/// Normalize persisted store rows, dropping invalid ones.
#[must_use]
pub fn normalize_persisted(rows: Vec<PersistedReviewRow>) -> Vec<Review> {
    let total = rows.len();
    let reviews: Vec<Review> = rows.into_iter().filter_map(persisted_to_review).collect();

    if reviews.len() < total {
        tracing::debug!(
            source = "persisted",
            dropped = total - reviews.len(),
            kept = reviews.len(),
            "dropped malformed persisted reviews"
        );
    }

    reviews
}

/// Normalize provider reviews, dropping invalid ones.
///
/// `fetched_at` anchors relative time descriptions for reviews that carry no
/// absolute timestamp.
#[must_use]
pub fn normalize_external(reviews: Vec<ExternalReview>, fetched_at: DateTime<Utc>) -> Vec<Review> {
    let total = reviews.len();
    let mut normalized: Vec<Review> = reviews
        .into_iter()
        .filter_map(|review| external_to_review(review, fetched_at))
        .collect();
    disambiguate_ids(&mut normalized);

    if normalized.len() < total {
        tracing::debug!(
            source = "external",
            dropped = total - normalized.len(),
            kept = normalized.len(),
            "dropped malformed external reviews"
        );
    }

    normalized
}

fn persisted_to_review(row: PersistedReviewRow) -> Option<Review> {
    if !row.is_public {
        return None;
    }
    let rating = valid_rating(i64::from(row.rating))?;
    let body_text = non_blank(row.comment.as_deref())?;

    let profile = row.profile.unwrap_or_default();
    let author_name = author_or_anonymous(profile.full_name.as_deref());
    let title =
        non_blank(row.title.as_deref()).unwrap_or_else(|| derive_title(&body_text));

    Some(Review {
        id: row.id,
        source: ReviewSource::Persisted,
        avatar_initial: avatar_initial(&author_name),
        author_name,
        author_country: non_blank(profile.country.as_deref()),
        profile_photo_url: non_blank(profile.avatar_url.as_deref()),
        rating,
        title,
        body_text,
        created_at: row.created_at,
        verified: row.is_verified,
        is_public: true,
    })
}

fn external_to_review(review: ExternalReview, fetched_at: DateTime<Utc>) -> Option<Review> {
    let rating = valid_rating(review.rating)?;
    let body_text = non_blank(review.text.as_deref())?;

    let created_at = match review.time {
        Some(secs) => DateTime::<Utc>::from_timestamp(secs, 0)?,
        None => resolve_relative_time(review.relative_time_description.as_deref()?, fetched_at)?,
    };

    let author_name = author_or_anonymous(review.author_name.as_deref());
    let author_country = review
        .language
        .as_deref()
        .map_or(country::UNKNOWN_COUNTRY, country_from_language)
        .to_string();

    Some(Review {
        id: external_id(created_at, &author_name, &body_text),
        source: ReviewSource::External,
        avatar_initial: avatar_initial(&author_name),
        title: derive_title(&body_text),
        author_name,
        author_country: Some(author_country),
        profile_photo_url: non_blank(review.profile_photo_url.as_deref()),
        rating,
        body_text,
        created_at,
        verified: true,
        is_public: true,
    })
}

/// Derive a title from a review body: the first [`TITLE_CHAR_BUDGET`]
/// characters, with `"..."` appended when the body is longer.
#[must_use]
pub fn derive_title(body: &str) -> String {
    if body.chars().count() <= TITLE_CHAR_BUDGET {
        return body.to_string();
    }
    let mut title: String = body.chars().take(TITLE_CHAR_BUDGET).collect();
    title.push_str(TITLE_ELLIPSIS);
    title
}

fn valid_rating(raw: i64) -> Option<u8> {
    u8::try_from(raw).ok().filter(|r| (1..=5).contains(r))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

fn author_or_anonymous(name: Option<&str>) -> String {
    non_blank(name).unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string())
}

fn avatar_initial(name: &str) -> char {
    name.chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('A')
}

/// Provider reviews have no stable id. The id combines the timestamp, a
/// case-preserving author slug, and the first 8 bytes of SHA-256 over
/// `author || body`, so it survives refetches unchanged.
fn external_id(created_at: DateTime<Utc>, author_name: &str, body: &str) -> String {
    let slug: String = author_name
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' {
                Some('-')
            } else {
                None
            }
        })
        .collect();
    let digest = Sha256::digest(format!("{author_name}\x00{body}").as_bytes());
    let fingerprint: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
    format!("google-{}-{slug}-{fingerprint}", created_at.timestamp())
}

/// Byte-identical reviews in one payload still get distinct ids: later
/// copies take a `-{n}` suffix in payload order.
fn disambiguate_ids(reviews: &mut [Review]) {
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(reviews.len());
    for review in reviews {
        let count = seen.entry(review.id.clone()).or_insert(0);
        if *count > 0 {
            review.id = format!("{}-{count}", review.id);
        }
        *count += 1;
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
