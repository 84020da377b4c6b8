use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use maikekai_core::{ExternalReview, PersistedReviewRow, Review, ReviewSource};

use crate::error::ReviewsError;
use crate::sources::{ExternalReviewSource, ReviewStore};

/// Build a valid review with the fields the ordering and stats code reads.
pub(crate) fn review(
    id: &str,
    source: ReviewSource,
    created_at: DateTime<Utc>,
    rating: u8,
) -> Review {
    Review {
        id: id.to_string(),
        source,
        author_name: format!("Guest {id}"),
        author_country: None,
        avatar_initial: 'G',
        profile_photo_url: None,
        rating,
        title: format!("Review {id}"),
        body_text: format!("Body of review {id}"),
        created_at,
        verified: true,
        is_public: true,
    }
}

pub(crate) fn persisted_row(
    id: &str,
    created_at: DateTime<Utc>,
    rating: i32,
) -> PersistedReviewRow {
    PersistedReviewRow {
        id: id.to_string(),
        rating,
        title: None,
        comment: Some(format!("Stayed for a week, review {id}")),
        is_verified: true,
        is_public: true,
        created_at,
        profile: None,
    }
}

pub(crate) fn external_review(author: &str, time: i64, rating: i64) -> ExternalReview {
    ExternalReview {
        author_name: Some(author.to_string()),
        language: Some("en".to_string()),
        rating,
        text: Some(format!("Great waves, {author}")),
        time: Some(time),
        ..ExternalReview::default()
    }
}

/// In-memory persisted store whose rows and failure mode can change between calls.
#[derive(Default)]
pub(crate) struct FakeStore {
    rows: Mutex<Vec<PersistedReviewRow>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeStore {
    pub(crate) fn with_rows(rows: Vec<PersistedReviewRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        let store = Self::default();
        store.failing.store(true, Ordering::SeqCst);
        store
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReviewStore for FakeStore {
    async fn fetch_public_reviews(&self) -> Result<Vec<PersistedReviewRow>, ReviewsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ReviewsError::Store("connection refused".to_string()));
        }
        Ok(self.rows.lock().unwrap().clone())
    }
}

/// Scripted provider. Each call pops the next `(delay, reviews)` entry; once
/// the script is exhausted the fallback reviews are returned immediately.
#[derive(Default)]
pub(crate) struct FakeExternal {
    script: Mutex<VecDeque<(Duration, Vec<ExternalReview>)>>,
    fallback: Mutex<Vec<ExternalReview>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeExternal {
    pub(crate) fn with_reviews(reviews: Vec<ExternalReview>) -> Self {
        Self {
            fallback: Mutex::new(reviews),
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        let source = Self::default();
        source.failing.store(true, Ordering::SeqCst);
        source
    }

    pub(crate) fn push_response(&self, delay: Duration, reviews: Vec<ExternalReview>) {
        self.script.lock().unwrap().push_back((delay, reviews));
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExternalReviewSource for FakeExternal {
    async fn fetch_place_reviews(
        &self,
        _place_id: &str,
    ) -> Result<Vec<ExternalReview>, ReviewsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ReviewsError::Upstream("REQUEST_DENIED".to_string()));
        }
        let scripted = self.script.lock().unwrap().pop_front();
        let (delay, reviews) =
            scripted.unwrap_or_else(|| (Duration::ZERO, self.fallback.lock().unwrap().clone()));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(reviews)
    }
}
