//! Resolve provider phrases like `"3 days ago"` to absolute timestamps.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(a|an|one|\d+)\s+(second|minute|hour|day|week|month|year)s?\s+ago$")
        .expect("valid relative time regex")
});

/// Resolve a relative time description against `now`.
///
/// Months count as 30 days and years as 365 days. Returns `None` for phrases
/// that are not recognised.
#[must_use]
pub fn resolve_relative_time(description: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let phrase = description.trim().to_ascii_lowercase();

    match phrase.as_str() {
        "just now" | "moments ago" | "a moment ago" | "a few seconds ago" => return Some(now),
        "in the last week" => return now.checked_sub_signed(Duration::weeks(1)),
        _ => {}
    }

    let caps = RELATIVE_RE.captures(&phrase)?;
    let amount: i64 = match &caps[1] {
        "a" | "an" | "one" => 1,
        n => n.parse().ok()?,
    };

    let offset = match &caps[2] {
        "second" => Duration::try_seconds(amount)?,
        "minute" => Duration::try_minutes(amount)?,
        "hour" => Duration::try_hours(amount)?,
        "day" => Duration::try_days(amount)?,
        "week" => Duration::try_weeks(amount)?,
        "month" => Duration::try_days(amount.checked_mul(30)?)?,
        "year" => Duration::try_days(amount.checked_mul(365)?)?,
        _ => return None,
    };

    now.checked_sub_signed(offset)
}
