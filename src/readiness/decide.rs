//! Decision assembly
//!
//! `decide` gathers the snapshot and permission sets (effectful), then
//! `evaluate` turns them into a `Decision` (pure, testable).

use crate::config::GitHubConfig;
use crate::error::Result;
use crate::permissions::resolve_permission_sets;
use crate::platform::PlatformService;
use crate::readiness::selector::{REQUIRED_APPROVALS, select_time_base_review};
use crate::readiness::snapshot::fetch_snapshot;
use crate::readiness::wait::{WaitTime, compute_wait_time};
use crate::types::{
    MergeableState, PermissionSets, PullRequestSnapshot, Review, ReviewState, StatusState,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Where a PR stands in the review process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPhase {
    /// No clock-start review: not enough approvals, or vetoed
    UnderReview,
    /// Clock is running, ready time not reached yet
    Waiting,
    /// Waiting period is over
    ReadyForMerge,
}

impl std::fmt::Display for ReviewPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnderReview => write!(f, "under review"),
            Self::Waiting => write!(f, "waiting"),
            Self::ReadyForMerge => write!(f, "ready for merge"),
        }
    }
}

/// Merge requirement checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirements {
    /// Mergeability of the PR
    pub mergeable: MergeableState,
    /// Status checks of the latest commit
    pub status: StatusState,
    /// Number of unresolved review threads
    pub unresolved_threads: u64,
    /// Number of latest reviews requesting changes
    pub change_requests: usize,
    /// Number of latest reviews approving
    pub approvals: usize,
}

impl Requirements {
    /// Build the checklist from a snapshot
    pub fn from_snapshot(snapshot: &PullRequestSnapshot) -> Self {
        Self {
            mergeable: snapshot.mergeable,
            status: snapshot.status,
            unresolved_threads: snapshot.threads.unresolved,
            change_requests: snapshot
                .reviews_with_state(ReviewState::ChangesRequested)
                .len(),
            approvals: snapshot.reviews_with_state(ReviewState::Approved).len(),
        }
    }

    /// No conflicts
    pub fn is_mergeable(&self) -> bool {
        self.mergeable == MergeableState::Mergeable
    }

    /// Status checks succeeded
    pub fn checks_passed(&self) -> bool {
        self.status == StatusState::Success
    }

    /// Every conversation is resolved
    pub const fn conversations_resolved(&self) -> bool {
        self.unresolved_threads == 0
    }

    /// Nobody is requesting changes
    pub const fn no_change_requests(&self) -> bool {
        self.change_requests == 0
    }

    /// At least the required number of approvals
    pub const fn enough_approvals(&self) -> bool {
        self.approvals >= REQUIRED_APPROVALS
    }

    /// Whether every requirement holds
    pub fn is_satisfied(&self) -> bool {
        self.is_mergeable()
            && self.checks_passed()
            && self.conversations_resolved()
            && self.no_change_requests()
            && self.enough_approvals()
    }

    /// Human-readable reasons for each failed requirement
    pub fn blocking_reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        match self.mergeable {
            MergeableState::Mergeable => {}
            MergeableState::Conflicting => reasons.push("Has merge conflicts".to_string()),
            MergeableState::Unknown => {
                reasons.push("Merge status unknown (still computing)".to_string());
            }
        }
        if !self.checks_passed() {
            reasons.push(format!("Status checks not passing ({})", self.status));
        }
        if !self.conversations_resolved() {
            reasons.push(plural(self.unresolved_threads, "unresolved conversation"));
        }
        if !self.no_change_requests() {
            reasons.push(plural(self.change_requests as u64, "change requesting review"));
        }
        if !self.enough_approvals() {
            reasons.push(format!(
                "{} ({REQUIRED_APPROVALS} required)",
                plural(self.approvals as u64, "approving review")
            ));
        }
        reasons
    }
}

fn plural(count: u64, noun: &str) -> String {
    let count_text = if count == 0 {
        "No".to_string()
    } else {
        count.to_string()
    };
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count_text} {noun}{suffix}")
}

/// Full merge-readiness decision for one pull request
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    /// Data the decision was made from
    pub snapshot: PullRequestSnapshot,
    /// Permission sets used as selector predicates
    pub permissions: PermissionSets,
    /// Review the waiting clock started at, if any
    pub clock_start: Option<Review>,
    /// Ready time, present only when there is a clock start
    pub wait: Option<WaitTime>,
    /// Review phase derived from `clock_start` and `wait`
    pub phase: ReviewPhase,
    /// Merge requirement checklist
    pub requirements: Requirements,
}

/// Turn fetched data into a decision (PURE - no I/O)
pub fn evaluate(
    snapshot: PullRequestSnapshot,
    permissions: PermissionSets,
    config: &GitHubConfig,
    now: DateTime<Utc>,
) -> Decision {
    let clock_start = select_time_base_review(
        &snapshot.latest_reviews,
        |login| permissions.has_write_access(login),
        |login| permissions.is_designated_reviewer(login),
    );

    let has_short_label = config
        .short_review_label
        .as_deref()
        .is_some_and(|label| snapshot.has_label(label));

    let wait = clock_start.as_ref().map(|review| {
        compute_wait_time(
            review,
            config.review_duration,
            config.short_review_duration,
            has_short_label,
            now,
        )
    });

    let phase = match wait {
        None => ReviewPhase::UnderReview,
        Some(w) if w.is_ready => ReviewPhase::ReadyForMerge,
        Some(_) => ReviewPhase::Waiting,
    };

    let requirements = Requirements::from_snapshot(&snapshot);

    Decision {
        snapshot,
        permissions,
        clock_start,
        wait,
        phase,
        requirements,
    }
}

/// Decide whether pull request `pr_number` of the configured repository is ready
///
/// The snapshot and the permission sets are fetched concurrently; any failure
/// fails the decision.
pub async fn decide(
    platform: &dyn PlatformService,
    pr_number: u64,
    config: &GitHubConfig,
    now: DateTime<Utc>,
) -> Result<Decision> {
    debug!(pr_number, "deciding merge readiness");

    let (snapshot, permissions) = tokio::try_join!(
        fetch_snapshot(platform, &config.organization, &config.repository, pr_number),
        resolve_permission_sets(platform, config),
    )?;

    let decision = evaluate(snapshot, permissions, config, now);
    debug!(
        pr_number,
        phase = %decision.phase,
        ready_at = ?decision.wait.map(|w| w.ready_at),
        "decided merge readiness"
    );
    Ok(decision)
}
