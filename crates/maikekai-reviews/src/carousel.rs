//! Timed featured-review carousel.
//!
//! [`Carousel::spawn`] starts one task that owns a [`RotationState`]. Handles
//! send commands over an mpsc channel and observe [`CarouselSnapshot`]s over
//! a `watch` channel. The task keeps at most one rotation interval alive, and
//! only while the state says a timer should run. The interval is dropped
//! (not muted) when auto-advance turns off or the view empties, and a fresh
//! one is created when rotation resumes.
//!
//! Loads run on a `JoinSet` owned by the task. Each load is tagged with a
//! generation number and only the newest generation is applied; dropping the
//! task aborts in-flight loads.

use std::sync::Arc;
use std::time::Duration;

use maikekai_core::{AggregateStats, Review};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::aggregator::ReviewAggregator;
use crate::error::ReviewsError;
use crate::rotation::RotationState;
use crate::sources::{ExternalReviewSource, ReviewStore};
use crate::types::{AggregateOutcome, ReviewFilter, SourceFailure};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(4000);
const COMMAND_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarouselCommand {
    Next,
    Previous,
    JumpTo(usize),
    ToggleAutoAdvance,
    SetFilter(ReviewFilter),
    Refresh,
    Dispose,
}

/// What a consumer renders: the filtered view and where rotation stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselSnapshot {
    pub reviews: Vec<Review>,
    pub current_index: Option<usize>,
    pub current: Option<Review>,
    pub auto_advance: bool,
    pub filter: ReviewFilter,
    /// Stats over the merged set, independent of the filter.
    pub stats: AggregateStats,
    pub fallback: bool,
    pub unavailable: Vec<SourceFailure>,
    /// A load is in flight.
    pub loading: bool,
}

impl CarouselSnapshot {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.current_index.is_none()
    }
}

/// Cloneable handle to a running carousel task.
#[derive(Debug, Clone)]
pub struct Carousel {
    commands: mpsc::Sender<CarouselCommand>,
    snapshots: watch::Receiver<CarouselSnapshot>,
}

impl Carousel {
    /// Spawn the carousel task and start the initial load.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewsError::ZeroInterval`] if `interval` is zero; no task
    /// is spawned in that case.
    pub fn spawn<S, E>(
        aggregator: Arc<ReviewAggregator<S, E>>,
        interval: Duration,
    ) -> Result<Self, ReviewsError>
    where
        S: ReviewStore,
        E: ExternalReviewSource,
    {
        if interval.is_zero() {
            return Err(ReviewsError::ZeroInterval);
        }
        let state = RotationState::new(Vec::new(), true);
        let outcome = AggregateOutcome {
            reviews: Vec::new(),
            stats: AggregateStats::empty(),
            fallback: false,
            unavailable: Vec::new(),
        };
        let (snapshot_tx, snapshots) = watch::channel(snapshot_of(&state, &outcome, true));
        let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);

        let task = CarouselTask {
            aggregator,
            state,
            outcome,
            interval,
            commands: command_rx,
            snapshots: snapshot_tx,
            loads: JoinSet::new(),
            latest_generation: 0,
        };
        tokio::spawn(task.run());

        Ok(Self {
            commands,
            snapshots,
        })
    }

    /// # Errors
    ///
    /// Returns [`ReviewsError::CarouselClosed`] once the task has stopped.
    pub async fn send(&self, command: CarouselCommand) -> Result<(), ReviewsError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ReviewsError::CarouselClosed)
    }

    /// # Errors
    ///
    /// Returns [`ReviewsError::CarouselClosed`] once the task has stopped.
    pub async fn next(&self) -> Result<(), ReviewsError> {
        self.send(CarouselCommand::Next).await
    }

    /// # Errors
    ///
    /// Returns [`ReviewsError::CarouselClosed`] once the task has stopped.
    pub async fn previous(&self) -> Result<(), ReviewsError> {
        self.send(CarouselCommand::Previous).await
    }

    /// # Errors
    ///
    /// Returns [`ReviewsError::CarouselClosed`] once the task has stopped.
    pub async fn jump_to(&self, index: usize) -> Result<(), ReviewsError> {
        self.send(CarouselCommand::JumpTo(index)).await
    }

    /// # Errors
    ///
    /// Returns [`ReviewsError::CarouselClosed`] once the task has stopped.
    pub async fn toggle_auto_advance(&self) -> Result<(), ReviewsError> {
        self.send(CarouselCommand::ToggleAutoAdvance).await
    }

    /// # Errors
    ///
    /// Returns [`ReviewsError::CarouselClosed`] once the task has stopped.
    pub async fn set_filter(&self, filter: ReviewFilter) -> Result<(), ReviewsError> {
        self.send(CarouselCommand::SetFilter(filter)).await
    }

    /// Re-fetch both sources, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewsError::CarouselClosed`] once the task has stopped.
    pub async fn refresh(&self) -> Result<(), ReviewsError> {
        self.send(CarouselCommand::Refresh).await
    }

    /// Stop the task, its timer and any in-flight load. Disposing twice is
    /// not an error.
    pub async fn dispose(&self) {
        // A closed channel means the task is already gone.
        let _ = self.commands.send(CarouselCommand::Dispose).await;
    }

    #[must_use]
    pub fn snapshot(&self) -> CarouselSnapshot {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CarouselSnapshot> {
        self.snapshots.clone()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.commands.is_closed()
    }
}

struct CarouselTask<S, E> {
    aggregator: Arc<ReviewAggregator<S, E>>,
    state: RotationState,
    outcome: AggregateOutcome,
    interval: Duration,
    commands: mpsc::Receiver<CarouselCommand>,
    snapshots: watch::Sender<CarouselSnapshot>,
    loads: JoinSet<(u64, AggregateOutcome)>,
    latest_generation: u64,
}

impl<S, E> CarouselTask<S, E>
where
    S: ReviewStore,
    E: ExternalReviewSource,
{
    async fn run(mut self) {
        self.start_load(false);
        let mut timer: Option<Interval> = None;

        loop {
            self.sync_timer(&mut timer);

            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(CarouselCommand::Dispose) => break,
                    Some(command) => self.handle(command),
                },
                Some(joined) = self.loads.join_next() => match joined {
                    Ok((generation, outcome)) => self.apply_load(generation, outcome),
                    Err(e) => tracing::warn!(error = %e, "carousel load task failed"),
                },
                () = next_tick(&mut timer) => {
                    self.state.tick();
                }
            }

            self.publish();
        }

        self.loads.abort_all();
        tracing::debug!("carousel disposed");
    }

    fn handle(&mut self, command: CarouselCommand) {
        match command {
            CarouselCommand::Next => self.state.next(),
            CarouselCommand::Previous => self.state.previous(),
            CarouselCommand::JumpTo(index) => {
                if !self.state.jump_to(index) {
                    tracing::debug!(index, "ignoring out-of-range jump");
                }
            }
            CarouselCommand::ToggleAutoAdvance => self.state.toggle_auto_advance(),
            CarouselCommand::SetFilter(filter) => self.state.set_filter(filter),
            CarouselCommand::Refresh => self.start_load(true),
            CarouselCommand::Dispose => {}
        }
    }

    fn start_load(&mut self, bypass_cache: bool) {
        self.latest_generation += 1;
        let generation = self.latest_generation;
        let aggregator = Arc::clone(&self.aggregator);
        self.loads.spawn(async move {
            let outcome = if bypass_cache {
                aggregator.refresh().await
            } else {
                aggregator.load().await
            };
            (generation, outcome)
        });
    }

    fn apply_load(&mut self, generation: u64, outcome: AggregateOutcome) {
        if generation != self.latest_generation {
            tracing::debug!(
                generation,
                latest = self.latest_generation,
                "discarding stale carousel load"
            );
            return;
        }
        self.state.replace_reviews(outcome.reviews.clone());
        self.outcome = outcome;
    }

    fn sync_timer(&self, timer: &mut Option<Interval>) {
        if !self.state.should_run_timer() {
            *timer = None;
            return;
        }
        if timer.is_none() {
            let mut fresh = interval_at(Instant::now() + self.interval, self.interval);
            fresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *timer = Some(fresh);
        }
    }

    fn publish(&self) {
        let loading = !self.loads.is_empty();
        self.snapshots
            .send_replace(snapshot_of(&self.state, &self.outcome, loading));
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn snapshot_of(state: &RotationState, outcome: &AggregateOutcome, loading: bool) -> CarouselSnapshot {
    CarouselSnapshot {
        reviews: state.ordered_reviews().to_vec(),
        current_index: state.current_index(),
        current: state.current().cloned(),
        auto_advance: state.auto_advance(),
        filter: state.filter(),
        stats: outcome.stats.clone(),
        fallback: outcome.fallback,
        unavailable: outcome.unavailable.clone(),
        loading,
    }
}

#[cfg(test)]
#[path = "carousel_test.rs"]
mod tests;
