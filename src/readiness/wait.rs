//! Wait-time calculation

use crate::types::Review;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// When a PR with a running clock becomes ready to merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WaitTime {
    /// Waiting period that applied
    #[serde(serialize_with = "serialize_delta")]
    pub duration: TimeDelta,
    /// Clock start plus the waiting period
    pub ready_at: DateTime<Utc>,
    /// Whether `ready_at` has been reached
    pub is_ready: bool,
    /// Time left until `ready_at` (zero once ready)
    #[serde(serialize_with = "serialize_delta")]
    pub remaining: TimeDelta,
}

/// Compute the ready time from the clock-start review
///
/// `short` replaces `base` when the PR carries the short-review label.
/// A ready time past the representable range saturates at the latest
/// representable instant.
pub fn compute_wait_time(
    clock_start: &Review,
    base: TimeDelta,
    short: TimeDelta,
    has_short_label: bool,
    now: DateTime<Utc>,
) -> WaitTime {
    let duration = if has_short_label { short } else { base };
    let ready_at = clock_start
        .submitted_at
        .checked_add_signed(duration)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let is_ready = now >= ready_at;
    let remaining = if is_ready {
        TimeDelta::zero()
    } else {
        ready_at - now
    };

    WaitTime {
        duration,
        ready_at,
        is_ready,
        remaining,
    }
}

fn serialize_delta<S: serde::Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&crate::config::format_duration(*value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewState;
    use chrono::TimeZone;

    fn approval_at(time: DateTime<Utc>) -> Review {
        Review {
            state: ReviewState::Approved,
            submitted_at: time,
            author_login: Some("carol".to_string()),
            url: "https://github.com/acme/widgets/pull/1#review-1".to_string(),
        }
    }

    #[test]
    fn test_short_label_picks_short_duration() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let wait = compute_wait_time(
            &approval_at(t0),
            TimeDelta::hours(48),
            TimeDelta::hours(24),
            true,
            t0,
        );
        assert_eq!(wait.duration, TimeDelta::hours(24));
        assert_eq!(wait.ready_at, t0 + TimeDelta::hours(24));
        assert_eq!(wait.remaining, TimeDelta::hours(24));
        assert!(!wait.is_ready);
    }

    #[test]
    fn test_ready_exactly_at_ready_time() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let wait = compute_wait_time(
            &approval_at(t0),
            TimeDelta::hours(48),
            TimeDelta::hours(24),
            false,
            t0 + TimeDelta::hours(48),
        );
        assert!(wait.is_ready);
        assert_eq!(wait.remaining, TimeDelta::zero());
    }

    #[test]
    fn test_huge_duration_saturates() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let wait = compute_wait_time(
            &approval_at(t0),
            TimeDelta::days(100_000_000),
            TimeDelta::hours(24),
            false,
            t0,
        );
        assert_eq!(wait.ready_at, DateTime::<Utc>::MAX_UTC);
        assert!(!wait.is_ready);
        assert!(wait.remaining > TimeDelta::zero());
    }

    #[test]
    fn test_serializes_durations_compactly() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let wait = compute_wait_time(
            &approval_at(t0),
            TimeDelta::hours(48),
            TimeDelta::hours(24),
            false,
            t0 + TimeDelta::hours(12),
        );
        let value = serde_json::to_value(wait).unwrap();
        assert_eq!(value["duration"], "2d");
        assert_eq!(value["remaining"], "1d12h");
        assert_eq!(value["is_ready"], false);
    }
}
