//! Background job scheduler.
//!
//! Registers the review-cache purge job and the featured-carousel refresh
//! job at server startup.

use std::sync::Arc;

use maikekai_core::Review;
use maikekai_reviews::{Carousel, ReviewCache};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Every ten minutes, on the minute.
const CACHE_PURGE_SCHEDULE: &str = "0 */10 * * * *";

/// Every five minutes, offset from the purge.
const CAROUSEL_REFRESH_SCHEDULE: &str = "30 */5 * * * *";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    cache: Arc<ReviewCache<Vec<Review>>>,
    carousel: Carousel,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_cache_purge_job(&scheduler, cache).await?;
    register_carousel_refresh_job(&scheduler, carousel).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_cache_purge_job(
    scheduler: &JobScheduler,
    cache: Arc<ReviewCache<Vec<Review>>>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(CACHE_PURGE_SCHEDULE, move |_uuid, _lock| {
        let cache = Arc::clone(&cache);

        Box::pin(async move {
            let purged = cache.purge_expired().await;
            tracing::debug!(purged, "scheduler: review cache purge complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn register_carousel_refresh_job(
    scheduler: &JobScheduler,
    carousel: Carousel,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(CAROUSEL_REFRESH_SCHEDULE, move |_uuid, _lock| {
        let carousel = carousel.clone();

        Box::pin(async move {
            if let Err(e) = carousel.refresh().await {
                tracing::warn!(error = %e, "scheduler: carousel refresh skipped");
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
