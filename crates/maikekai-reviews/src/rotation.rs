//! Featured-review rotation state machine.
//!
//! Pure and synchronous. The carousel task owns one instance and is the only
//! thing that mutates it. An empty view is the `Idle` state: there is no
//! current index and the timer must not run, but the `auto_advance` flag is
//! kept so rotation resumes when the view fills again.

use maikekai_core::Review;

use crate::types::ReviewFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    merged: Vec<Review>,
    filter: ReviewFilter,
    ordered: Vec<Review>,
    current_index: Option<usize>,
    auto_advance: bool,
}

impl RotationState {
    /// Start over an already merged (newest-first) set with no filter.
    #[must_use]
    pub fn new(merged: Vec<Review>, auto_advance: bool) -> Self {
        let current_index = if merged.is_empty() { None } else { Some(0) };
        Self {
            ordered: merged.clone(),
            merged,
            filter: ReviewFilter::default(),
            current_index,
            auto_advance,
        }
    }

    /// The filtered view the carousel rotates through.
    #[must_use]
    pub fn ordered_reviews(&self) -> &[Review] {
        &self.ordered
    }

    #[must_use]
    pub fn merged_reviews(&self) -> &[Review] {
        &self.merged
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    #[must_use]
    pub fn current(&self) -> Option<&Review> {
        self.current_index.and_then(|i| self.ordered.get(i))
    }

    #[must_use]
    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    #[must_use]
    pub fn filter(&self) -> ReviewFilter {
        self.filter
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Whether a rotation timer should exist right now.
    #[must_use]
    pub fn should_run_timer(&self) -> bool {
        self.auto_advance && !self.is_idle()
    }

    /// Manual advance. Pauses auto-advance.
    pub fn next(&mut self) {
        self.auto_advance = false;
        self.step_forward();
    }

    /// Manual step back. Pauses auto-advance.
    pub fn previous(&mut self) {
        self.auto_advance = false;
        let len = self.ordered.len();
        if let Some(i) = self.current_index {
            self.current_index = Some((i + len - 1) % len);
        }
    }

    /// Jump directly to `index`. Returns `false` (and changes nothing) when
    /// `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.ordered.len() {
            return false;
        }
        self.current_index = Some(index);
        true
    }

    pub fn toggle_auto_advance(&mut self) {
        self.auto_advance = !self.auto_advance;
    }

    /// Re-derive the view from the merged set and reset to the first review.
    pub fn set_filter(&mut self, filter: ReviewFilter) {
        self.filter = filter;
        self.ordered = filter.apply(&self.merged);
        self.current_index = if self.ordered.is_empty() { None } else { Some(0) };
    }

    /// Swap in a freshly merged set, keeping the active filter.
    ///
    /// The current index survives when it still points inside the new view;
    /// otherwise rotation restarts at the first review.
    pub fn replace_reviews(&mut self, merged: Vec<Review>) {
        self.merged = merged;
        self.ordered = self.filter.apply(&self.merged);
        self.current_index = match self.current_index {
            _ if self.ordered.is_empty() => None,
            Some(i) if i < self.ordered.len() => Some(i),
            _ => Some(0),
        };
    }

    /// Timer-driven advance. Returns `true` when the index moved.
    ///
    /// Leaves `auto_advance` untouched and does nothing while paused or idle.
    pub fn tick(&mut self) -> bool {
        if !self.should_run_timer() {
            return false;
        }
        self.step_forward();
        true
    }

    fn step_forward(&mut self) {
        let len = self.ordered.len();
        if let Some(i) = self.current_index {
            self.current_index = Some((i + 1) % len);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use maikekai_core::ReviewSource;

    use super::*;
    use crate::merge::{merge_reviews, merge_with_fallback};
    use crate::normalize::normalize_external;
    use crate::stats::compute_stats;
    use crate::test_support::{external_review, review};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn five_reviews() -> Vec<Review> {
        let persisted = (0..3)
            .map(|i| review(&format!("p{i}"), ReviewSource::Persisted, day(10 - i), 5))
            .collect();
        let external = (0..2)
            .map(|i| review(&format!("e{i}"), ReviewSource::External, day(5 - i), 3))
            .collect();
        merge_reviews(persisted, external)
    }

    #[test]
    fn next_wraps_from_last_to_first() {
        let mut state = RotationState::new(five_reviews(), false);
        assert!(state.jump_to(4));
        state.next();
        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn previous_wraps_from_first_to_last() {
        let mut state = RotationState::new(five_reviews(), false);
        state.previous();
        assert_eq!(state.current_index(), Some(4));
    }

    #[test]
    fn manual_navigation_pauses_auto_advance() {
        let mut state = RotationState::new(five_reviews(), true);
        state.next();
        assert!(!state.auto_advance());

        state.toggle_auto_advance();
        assert!(state.auto_advance());
        state.previous();
        assert!(!state.auto_advance());
    }

    #[test]
    fn toggle_keeps_index() {
        let mut state = RotationState::new(five_reviews(), true);
        state.jump_to(2);
        state.toggle_auto_advance();
        assert_eq!(state.current_index(), Some(2));
        assert!(!state.should_run_timer());
    }

    #[test]
    fn out_of_range_jump_is_ignored() {
        let mut state = RotationState::new(five_reviews(), true);
        state.jump_to(1);
        assert!(!state.jump_to(5));
        assert_eq!(state.current_index(), Some(1));
    }

    #[test]
    fn set_filter_resets_index_and_recomputes_view() {
        let mut state = RotationState::new(five_reviews(), true);
        state.jump_to(3);

        state.set_filter(ReviewFilter {
            source: Some(ReviewSource::External),
            min_rating: None,
        });

        assert_eq!(state.current_index(), Some(0));
        assert_eq!(state.ordered_reviews().len(), 2);
        assert!(state
            .ordered_reviews()
            .iter()
            .all(|r| r.source == ReviewSource::External));
        assert_eq!(state.merged_reviews().len(), 5);
    }

    #[test]
    fn narrow_filter_goes_idle_and_suspends_timer() {
        let mut state = RotationState::new(five_reviews(), true);
        state.set_filter(ReviewFilter {
            source: Some(ReviewSource::External),
            min_rating: Some(4),
        });

        assert!(state.is_idle());
        assert_eq!(state.current_index(), None);
        assert!(state.current().is_none());
        assert!(!state.should_run_timer());
        assert!(state.auto_advance(), "flag survives so rotation can resume");
        assert!(!state.tick());

        state.next();
        state.previous();
        assert_eq!(state.current_index(), None);
    }

    #[test]
    fn clearing_filter_leaves_idle() {
        let mut state = RotationState::new(five_reviews(), true);
        state.set_filter(ReviewFilter {
            source: None,
            min_rating: Some(5),
        });
        assert_eq!(state.ordered_reviews().len(), 3);

        state.set_filter(ReviewFilter {
            source: Some(ReviewSource::External),
            min_rating: Some(5),
        });
        assert!(state.is_idle());

        state.set_filter(ReviewFilter::default());
        assert_eq!(state.current_index(), Some(0));
        assert!(state.should_run_timer());
    }

    #[test]
    fn tick_advances_without_pausing() {
        let mut state = RotationState::new(five_reviews(), true);
        assert!(state.tick());
        assert!(state.tick());
        assert_eq!(state.current_index(), Some(2));
        assert!(state.auto_advance());
    }

    #[test]
    fn tick_is_a_no_op_while_paused() {
        let mut state = RotationState::new(five_reviews(), false);
        assert!(!state.tick());
        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn replace_keeps_index_in_bounds_and_reapplies_filter() {
        let mut state = RotationState::new(five_reviews(), true);
        state.set_filter(ReviewFilter {
            source: Some(ReviewSource::Persisted),
            min_rating: None,
        });
        state.jump_to(2);

        let mut refreshed = five_reviews();
        refreshed.push(review("p-new", ReviewSource::Persisted, day(0), 4));
        state.replace_reviews(refreshed);

        assert_eq!(state.current_index(), Some(2));
        assert_eq!(state.ordered_reviews().len(), 4);
        assert!(state
            .ordered_reviews()
            .iter()
            .all(|r| r.source == ReviewSource::Persisted));
    }

    #[test]
    fn replace_with_shorter_set_restarts_at_first() {
        let mut state = RotationState::new(five_reviews(), true);
        state.jump_to(4);
        state.replace_reviews(five_reviews().into_iter().take(2).collect());
        assert_eq!(state.current_index(), Some(0));

        state.replace_reviews(Vec::new());
        assert!(state.is_idle());
    }

    #[test]
    fn empty_state_is_idle() {
        let state = RotationState::new(Vec::new(), true);
        assert!(state.is_idle());
        assert_eq!(state.current_index(), None);
        assert!(!state.should_run_timer());
    }

    #[test]
    fn fallback_set_is_immediately_usable() {
        let merged = merge_with_fallback(Vec::new(), Vec::new());
        let mut state = RotationState::new(merged.reviews, true);
        assert!(!state.is_idle());
        assert_eq!(state.current_index(), Some(0));
        assert!(state.tick());
        assert_eq!(state.current_index(), Some(1));
    }

    #[test]
    fn two_source_scenario() {
        let a = vec![review("a1", ReviewSource::Persisted, day(3), 5)];
        let b = normalize_external(
            vec![
                external_review("Emma Thompson", day(5).timestamp(), 4),
                external_review("Carlos Silva", day(1).timestamp(), 7),
            ],
            day(6),
        );
        assert_eq!(b.len(), 1, "rating 7 is dropped by the normalizer");

        let merged = merge_reviews(a, b);
        let authors: Vec<&str> = merged.iter().map(|r| r.author_name.as_str()).collect();
        assert_eq!(authors, vec!["Emma Thompson", "Guest a1"]);
        assert_eq!(merged[1].id, "a1");

        let stats = compute_stats(&merged);
        assert_eq!(stats.average_rating, rust_decimal::Decimal::new(45, 1));
        assert_eq!(stats.total_count, 2);

        let state = RotationState::new(merged, true);
        assert_eq!(
            state.current().map(|r| r.author_name.as_str()),
            Some("Emma Thompson")
        );
    }
}
