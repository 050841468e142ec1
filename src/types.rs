//! Core types for gatekeep

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// State of a single pull request review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// Reviewer approved the changes
    Approved,
    /// Reviewer asked for changes
    ChangesRequested,
    /// Review only left comments
    Commented,
    /// Review was dismissed
    Dismissed,
    /// Review has not been submitted yet
    Pending,
    /// Any state this crate does not know about
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::ChangesRequested => write!(f, "changes requested"),
            Self::Commented => write!(f, "commented"),
            Self::Dismissed => write!(f, "dismissed"),
            Self::Pending => write!(f, "pending"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// One user's most recent review on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review state
    pub state: ReviewState,
    /// When the review was submitted
    pub submitted_at: DateTime<Utc>,
    /// Login of the reviewing user (None for deleted accounts, bots, mannequins)
    pub author_login: Option<String>,
    /// Web URL of the review (display only)
    pub url: String,
}

/// Whether a pull request can be merged without conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeableState {
    /// Can be cleanly merged
    Mergeable,
    /// Has merge conflicts
    Conflicting,
    /// GitHub is still computing mergeability
    Unknown,
}

impl std::fmt::Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mergeable => write!(f, "can be cleanly merged"),
            Self::Conflicting => write!(f, "contains merge conflicts"),
            Self::Unknown => write!(f, "mergeability under calculation"),
        }
    }
}

/// Combined status-check state of a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusState {
    /// All checks passed
    Success,
    /// At least one check failed
    Failure,
    /// At least one check errored
    Error,
    /// Checks are still running
    Pending,
    /// Checks are expected but have not reported yet
    Expected,
}

impl std::fmt::Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "successful status checks"),
            Self::Failure => write!(f, "failed status checks"),
            Self::Error => write!(f, "errors in status checks"),
            Self::Pending => write!(f, "pending status checks"),
            Self::Expected => write!(f, "status checks are expected to run"),
        }
    }
}

/// Pull request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Descriptive information about a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Web URL for the PR
    pub url: String,
    /// Current state of the PR
    pub state: PrState,
    /// Whether PR is a draft
    pub is_draft: bool,
    /// Names of the labels on the PR
    pub labels: Vec<String>,
    /// Login of the PR author, if it still exists
    pub author_login: Option<String>,
}

/// Resolved / unresolved review thread counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadCounts {
    /// Threads marked as resolved
    pub resolved: u64,
    /// Threads still open
    pub unresolved: u64,
}

/// Everything fetched about a pull request for one decision
///
/// Built fresh for each decision request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestSnapshot {
    /// Descriptive PR information
    pub info: PullRequestInfo,
    /// Mergeability of the PR
    pub mergeable: MergeableState,
    /// Status-check rollup of the most recent commit
    pub status: StatusState,
    /// Review thread resolution counts
    pub threads: ThreadCounts,
    /// Latest review per author (order not significant)
    pub latest_reviews: Vec<Review>,
}

impl PullRequestSnapshot {
    /// Latest reviews that are in the given state
    pub fn reviews_with_state(&self, state: ReviewState) -> Vec<&Review> {
        self.latest_reviews
            .iter()
            .filter(|r| r.state == state)
            .collect()
    }

    /// Whether the PR carries a label with exactly this name
    pub fn has_label(&self, name: &str) -> bool {
        self.info.labels.iter().any(|l| l == name)
    }
}

/// Repository permission level of a collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepositoryPermission {
    /// Full administrative access
    Admin,
    /// Manage the repository without destructive actions
    Maintain,
    /// Push access
    Write,
    /// Manage issues and PRs without write access
    Triage,
    /// Read-only access
    Read,
    /// Permission value this crate does not know about
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RepositoryPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Maintain => write!(f, "MAINTAIN"),
            Self::Write => write!(f, "WRITE"),
            Self::Triage => write!(f, "TRIAGE"),
            Self::Read => write!(f, "READ"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A repository collaborator and their effective permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    /// User login
    pub login: String,
    /// Effective repository permission
    pub permission: RepositoryPermission,
}

/// Lookup sets used as predicates by the review selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSets {
    /// Logins with at least the configured minimum repository permission
    pub write_access: HashSet<String>,
    /// Logins belonging to the designated reviewer team
    pub designated_reviewers: HashSet<String>,
}

impl PermissionSets {
    /// Whether `login` has write (or the configured minimum) access
    pub fn has_write_access(&self, login: &str) -> bool {
        self.write_access.contains(login)
    }

    /// Whether `login` is a member of the reviewer team
    pub fn is_designated_reviewer(&self, login: &str) -> bool {
        self.designated_reviewers.contains(login)
    }
}

/// One page of open pull requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PullRequestPage {
    /// Pull requests on this page, sorted by number
    pub entries: Vec<PullRequestInfo>,
    /// Total number of matching pull requests
    pub total_count: u64,
    /// Whether another page follows
    pub has_next_page: bool,
    /// Cursor to pass as `after` for the next page
    pub end_cursor: Option<String>,
}
