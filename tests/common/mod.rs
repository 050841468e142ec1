//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{ListPrsCall, MockPlatformService, method};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use gatekeep::config::GitHubConfig;
use gatekeep::permissions::PermissionRanking;
use gatekeep::types::{Collaborator, RepositoryPermission, Review, ReviewState};

/// Fixed reference instant all fixtures count from
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// `t0` plus `hours`
pub fn hours_after_t0(hours: i64) -> DateTime<Utc> {
    t0() + TimeDelta::hours(hours)
}

/// Review by `login` submitted `hours` after `t0`
pub fn review(state: ReviewState, login: &str, hours: i64) -> Review {
    Review {
        state,
        submitted_at: hours_after_t0(hours),
        author_login: Some(login.to_string()),
        url: format!("https://github.com/acme/widgets/pull/7#pullrequestreview-{hours}"),
    }
}

/// Approval by `login` submitted `hours` after `t0`
pub fn approval(login: &str, hours: i64) -> Review {
    review(ReviewState::Approved, login, hours)
}

/// Change request by `login` submitted `hours` after `t0`
pub fn change_request(login: &str, hours: i64) -> Review {
    review(ReviewState::ChangesRequested, login, hours)
}

/// Collaborator with the given permission
pub fn collaborator(login: &str, permission: RepositoryPermission) -> Collaborator {
    Collaborator {
        login: login.to_string(),
        permission,
    }
}

/// Configuration for acme/widgets with a `fast-track` short-review label
pub fn github_config() -> GitHubConfig {
    GitHubConfig {
        organization: "acme".to_string(),
        repository: "widgets".to_string(),
        reviewers_team: "mapping-reviewers".to_string(),
        target_label: "mappings".to_string(),
        short_review_label: Some("fast-track".to_string()),
        review_duration: TimeDelta::hours(48),
        short_review_duration: TimeDelta::hours(24),
        minimum_permission: RepositoryPermission::Write,
        permission_ranking: PermissionRanking::default(),
        host: None,
    }
}

/// Mock with `carol` as designated reviewer and `maint` as a maintainer
pub fn standard_mock() -> MockPlatformService {
    let mock = MockPlatformService::new();
    mock.set_team_members(&["carol"]);
    mock.set_collaborators(vec![
        collaborator("maint", RepositoryPermission::Maintain),
        collaborator("writer", RepositoryPermission::Write),
        collaborator("triager", RepositoryPermission::Triage),
        collaborator("reader", RepositoryPermission::Read),
    ]);
    mock
}
