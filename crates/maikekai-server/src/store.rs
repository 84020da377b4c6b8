//! Postgres-backed persisted review source.

use maikekai_core::PersistedReviewRow;
use maikekai_reviews::{ReviewStore, ReviewsError};
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReviewStore for PgReviewStore {
    async fn fetch_public_reviews(&self) -> Result<Vec<PersistedReviewRow>, ReviewsError> {
        let rows = maikekai_db::list_public_reviews(&self.pool)
            .await
            .map_err(|e| ReviewsError::Store(e.to_string()))?;
        Ok(rows.into_iter().map(PersistedReviewRow::from).collect())
    }
}
