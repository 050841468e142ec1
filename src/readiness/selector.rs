//! Time-base review selection - the pure core of the decision
//!
//! No I/O happens here; the review list and both permission predicates are
//! passed in.

use crate::types::{Review, ReviewState};

/// Number of approvals needed before the waiting clock can start
pub const REQUIRED_APPROVALS: usize = 2;

/// Scan state while walking reviews in chronological order
#[derive(Debug, Default)]
struct Scan<'a> {
    approvals: usize,
    approved_by_designated: bool,
    clock_start: Option<&'a Review>,
}

/// Outcome of feeding one review into the scan
enum Step<'a> {
    Continue(Scan<'a>),
    Veto,
}

impl<'a> Scan<'a> {
    fn feed(
        mut self,
        review: &'a Review,
        login: &str,
        has_write_access: &impl Fn(&str) -> bool,
        is_designated_reviewer: &impl Fn(&str) -> bool,
    ) -> Step<'a> {
        match review.state {
            ReviewState::Approved => {
                self.approvals += 1;
                if is_designated_reviewer(login) {
                    self.approved_by_designated = true;
                }
                if self.clock_start.is_none()
                    && self.approvals >= REQUIRED_APPROVALS
                    && self.approved_by_designated
                {
                    self.clock_start = Some(review);
                }
                Step::Continue(self)
            }
            ReviewState::ChangesRequested
                if has_write_access(login) || is_designated_reviewer(login) =>
            {
                Step::Veto
            }
            _ => Step::Continue(self),
        }
    }
}

/// Select the review that starts the waiting-period clock
///
/// Reviews are walked oldest first. Only user-authored approvals and change
/// requests count. The clock starts at the approval that brings the count to
/// [`REQUIRED_APPROVALS`] or more once any designated reviewer has approved.
/// A change request from a write-access or designated account anywhere in the
/// list means there is no clock at all, even if one had already started.
///
/// Reviews are not deduplicated by author; callers pass the latest review of
/// each author.
pub fn select_time_base_review<W, D>(
    reviews: &[Review],
    has_write_access: W,
    is_designated_reviewer: D,
) -> Option<Review>
where
    W: Fn(&str) -> bool,
    D: Fn(&str) -> bool,
{
    let mut sorted: Vec<&Review> = reviews.iter().collect();
    sorted.sort_by_key(|r| r.submitted_at);

    let mut scan = Scan::default();
    for review in sorted {
        let Some(login) = review.author_login.as_deref() else {
            continue;
        };
        match scan.feed(review, login, &has_write_access, &is_designated_reviewer) {
            Step::Continue(next) => scan = next,
            Step::Veto => return None,
        }
    }

    scan.clock_start.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn review(state: ReviewState, hour: u32, login: Option<&str>) -> Review {
        Review {
            state,
            submitted_at: at(hour),
            author_login: login.map(ToString::to_string),
            url: format!("https://github.com/acme/widgets/pull/1#review-{hour}"),
        }
    }

    fn select(reviews: &[Review], writers: &[&str], designated: &[&str]) -> Option<Review> {
        select_time_base_review(
            reviews,
            |login| writers.contains(&login),
            |login| designated.contains(&login),
        )
    }

    #[test]
    fn test_clock_starts_at_second_approval_after_designated() {
        let reviews = vec![
            review(ReviewState::Approved, 1, Some("alice")),
            review(ReviewState::Approved, 2, Some("bob")),
        ];
        let start = select(&reviews, &[], &["bob"]).unwrap();
        assert_eq!(start.submitted_at, at(2));
    }

    #[test]
    fn test_clock_waits_for_designated_approval() {
        let reviews = vec![
            review(ReviewState::Approved, 1, Some("alice")),
            review(ReviewState::Approved, 2, Some("dave")),
            review(ReviewState::Approved, 3, Some("carol")),
        ];
        let start = select(&reviews, &[], &["carol"]).unwrap();
        assert_eq!(start.author_login.as_deref(), Some("carol"));
    }

    #[test]
    fn test_input_order_is_irrelevant() {
        let reviews = vec![
            review(ReviewState::Approved, 5, Some("dave")),
            review(ReviewState::Approved, 1, Some("carol")),
        ];
        let start = select(&reviews, &[], &["carol"]).unwrap();
        assert_eq!(start.submitted_at, at(5));
    }

    #[test]
    fn test_reviews_without_author_are_ignored() {
        let reviews = vec![
            review(ReviewState::Approved, 1, Some("carol")),
            review(ReviewState::Approved, 2, None),
            review(ReviewState::ChangesRequested, 3, None),
        ];
        assert_eq!(select(&reviews, &[], &["carol"]), None);
    }

    #[test]
    fn test_neutral_states_never_matter() {
        let reviews = vec![
            review(ReviewState::Approved, 1, Some("carol")),
            review(ReviewState::Commented, 2, Some("erin")),
            review(ReviewState::Dismissed, 3, Some("erin")),
            review(ReviewState::Pending, 4, Some("erin")),
            review(ReviewState::Other, 5, Some("erin")),
            review(ReviewState::Approved, 6, Some("dave")),
        ];
        let start = select(&reviews, &["erin"], &["carol", "erin"]).unwrap();
        assert_eq!(start.submitted_at, at(6));
    }

    #[test]
    fn test_designated_change_request_vetoes() {
        let reviews = vec![
            review(ReviewState::Approved, 1, Some("alice")),
            review(ReviewState::Approved, 2, Some("bob")),
            review(ReviewState::ChangesRequested, 3, Some("carol")),
        ];
        assert_eq!(select(&reviews, &[], &["bob", "carol"]), None);
    }

    #[test]
    fn test_privileged_veto_before_approvals_still_blocks() {
        let reviews = vec![
            review(ReviewState::ChangesRequested, 1, Some("maint")),
            review(ReviewState::Approved, 2, Some("carol")),
            review(ReviewState::Approved, 3, Some("dave")),
        ];
        assert_eq!(select(&reviews, &["maint"], &["carol"]), None);
    }

    #[test]
    fn test_duplicate_approvals_each_count() {
        let reviews = vec![
            review(ReviewState::Approved, 1, Some("carol")),
            review(ReviewState::Approved, 2, Some("carol")),
        ];
        let start = select(&reviews, &[], &["carol"]).unwrap();
        assert_eq!(start.submitted_at, at(2));
    }
}
