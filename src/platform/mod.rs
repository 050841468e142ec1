//! Platform services
//!
//! The data sources the decision engine reads from. Each method is one
//! independent query; the readiness module decides how to combine them.

mod github;
mod graphql;

pub use github::GitHubService;
pub use graphql::{GraphQlResponse, PageInfo};

use crate::auth::get_github_auth;
use crate::config::GitHubConfig;
use crate::error::Result;
use crate::types::{
    Collaborator, MergeableState, PullRequestInfo, PullRequestPage, Review, StatusState,
    ThreadCounts,
};
use async_trait::async_trait;
use tracing::debug;

/// Platform service trait for pull request data
///
/// Every method may fail with a transport error or with a data-shape error
/// (`Error::MissingData` / `Error::NotFound`); implementations must never
/// substitute a default for an absent field.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Title, state, labels and author of a PR
    async fn fetch_pull_request_info(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<PullRequestInfo>;

    /// Whether the PR can be merged without conflicts
    async fn fetch_mergeability(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<MergeableState>;

    /// Status-check rollup of the most recent commit
    ///
    /// Fails if the PR has no commits or the commit has no rollup.
    async fn fetch_latest_commit_status(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<StatusState>;

    /// Resolved / unresolved review thread counts
    async fn fetch_review_thread_counts(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<ThreadCounts>;

    /// Latest submitted review of each reviewer
    async fn fetch_latest_reviews(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>>;

    /// Logins of every member of an organization team
    async fn fetch_team_members(&self, organization: &str, team_slug: &str)
    -> Result<Vec<String>>;

    /// Every repository collaborator with their permission
    async fn fetch_collaborators(&self, owner: &str, repo: &str) -> Result<Vec<Collaborator>>;

    /// One page of open pull requests carrying all of `labels`
    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        labels: &[String],
        page_size: u32,
        after: Option<&str>,
    ) -> Result<PullRequestPage>;
}

/// Create the GitHub platform service for a configuration
pub async fn create_platform_service(config: &GitHubConfig) -> Result<Box<dyn PlatformService>> {
    let auth = get_github_auth(config.host.as_deref()).await?;
    debug!(source = ?auth.source, host = ?auth.host, "resolved GitHub token");
    let service = GitHubService::new(&auth.token, auth.host)?;
    Ok(Box::new(service))
}
