//! Snapshot aggregation - concurrent fan-out over the platform queries

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::PullRequestSnapshot;
use tracing::debug;

/// Fetch everything the decision needs about one pull request
///
/// All queries run concurrently. The first failure fails the whole snapshot
/// and the remaining in-flight queries are dropped; a partial snapshot is
/// never returned.
pub async fn fetch_snapshot(
    platform: &dyn PlatformService,
    owner: &str,
    repo: &str,
    pr_number: u64,
) -> Result<PullRequestSnapshot> {
    debug!(owner, repo, pr_number, "fetching PR snapshot");

    let (info, mergeable, status, threads, latest_reviews) = tokio::try_join!(
        platform.fetch_pull_request_info(owner, repo, pr_number),
        platform.fetch_mergeability(owner, repo, pr_number),
        platform.fetch_latest_commit_status(owner, repo, pr_number),
        platform.fetch_review_thread_counts(owner, repo, pr_number),
        platform.fetch_latest_reviews(owner, repo, pr_number),
    )?;

    debug!(
        pr_number,
        ?mergeable,
        ?status,
        unresolved = threads.unresolved,
        reviews = latest_reviews.len(),
        "fetched PR snapshot"
    );

    Ok(PullRequestSnapshot {
        info,
        mergeable,
        status,
        threads,
        latest_reviews,
    })
}
