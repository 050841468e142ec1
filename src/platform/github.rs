//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::platform::graphql::{
    GraphQlResponse, PageInfo, PullRequestData, RepositoryData, present,
};
use crate::types::{
    Collaborator, MergeableState, PrState, PullRequestInfo, PullRequestPage, RepositoryPermission,
    Review, ReviewState, StatusState, ThreadCounts,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Page size for every paginated connection
const PAGE_SIZE: u32 = 100;

const PULL_REQUEST_INFO_QUERY: &str = r"
query GetPullRequestInfo($owner: String!, $name: String!, $number: Int!) {
    repository(owner: $owner, name: $name) {
        pullRequest(number: $number) {
            ...PullRequestInfo
        }
    }
}
";

const MERGEABILITY_QUERY: &str = r"
query GetMergeability($owner: String!, $name: String!, $number: Int!) {
    repository(owner: $owner, name: $name) {
        pullRequest(number: $number) {
            mergeable
        }
    }
}
";

const LATEST_COMMIT_STATUS_QUERY: &str = r"
query GetLatestCommitStatus($owner: String!, $name: String!, $number: Int!) {
    repository(owner: $owner, name: $name) {
        pullRequest(number: $number) {
            commits(last: 1) {
                nodes {
                    commit {
                        statusCheckRollup {
                            state
                        }
                    }
                }
            }
        }
    }
}
";

const REVIEW_THREADS_QUERY: &str = r"
query GetReviewThreads($owner: String!, $name: String!, $number: Int!, $first: Int!, $after: String) {
    repository(owner: $owner, name: $name) {
        pullRequest(number: $number) {
            reviewThreads(first: $first, after: $after) {
                nodes {
                    isResolved
                }
                pageInfo {
                    hasNextPage
                    endCursor
                }
            }
        }
    }
}
";

const LATEST_REVIEWS_QUERY: &str = r"
query GetLatestReviews($owner: String!, $name: String!, $number: Int!, $first: Int!, $after: String) {
    repository(owner: $owner, name: $name) {
        pullRequest(number: $number) {
            latestReviews(first: $first, after: $after) {
                nodes {
                    state
                    submittedAt
                    url
                    author {
                        __typename
                        ... on User {
                            login
                        }
                    }
                }
                pageInfo {
                    hasNextPage
                    endCursor
                }
            }
        }
    }
}
";

const TEAM_MEMBERS_QUERY: &str = r"
query GetTeamMembers($organization: String!, $team: String!, $first: Int!, $after: String) {
    organization(login: $organization) {
        team(slug: $team) {
            members(first: $first, after: $after) {
                nodes {
                    login
                }
                pageInfo {
                    hasNextPage
                    endCursor
                }
            }
        }
    }
}
";

const COLLABORATORS_QUERY: &str = r"
query GetCollaborators($owner: String!, $name: String!, $first: Int!, $after: String) {
    repository(owner: $owner, name: $name) {
        collaborators(first: $first, after: $after) {
            edges {
                permission
                node {
                    login
                }
            }
            pageInfo {
                hasNextPage
                endCursor
            }
        }
    }
}
";

const LIST_PULL_REQUESTS_QUERY: &str = r"
query ListPullRequests($owner: String!, $name: String!, $first: Int!, $after: String, $labels: [String!]) {
    repository(owner: $owner, name: $name) {
        pullRequests(first: $first, after: $after, labels: $labels, states: [OPEN]) {
            totalCount
            nodes {
                ...PullRequestInfo
            }
            pageInfo {
                hasNextPage
                endCursor
            }
        }
    }
}
";

const PULL_REQUEST_INFO_FRAGMENT: &str = r"
fragment PullRequestInfo on PullRequest {
    number
    title
    url
    state
    isDraft
    author {
        login
    }
    labels(first: 100) {
        nodes {
            name
        }
        pageInfo {
            hasNextPage
            endCursor
        }
    }
}
";

const PULL_REQUEST_LABELS_QUERY: &str = r"
query GetPullRequestLabels($owner: String!, $name: String!, $number: Int!, $first: Int!, $after: String) {
    repository(owner: $owner, name: $name) {
        pullRequest(number: $number) {
            labels(first: $first, after: $after) {
                nodes {
                    name
                }
                pageInfo {
                    hasNextPage
                    endCursor
                }
            }
        }
    }
}
";

// GraphQL response shapes

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlPullRequestInfo {
    number: u64,
    title: String,
    url: String,
    state: PrState,
    is_draft: bool,
    author: Option<ActorNode>,
    labels: Option<PagedNodes<LabelNode>>,
}

#[derive(Deserialize)]
struct ActorNode {
    login: String,
}

#[derive(Deserialize)]
struct LabelNode {
    name: String,
}

#[derive(Deserialize)]
struct NodeList<T> {
    nodes: Option<Vec<Option<T>>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PagedNodes<T> {
    nodes: Option<Vec<Option<T>>>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
struct MergeableNode {
    mergeable: Option<MergeableState>,
}

#[derive(Deserialize)]
struct CommitsNode {
    commits: NodeList<CommitNode>,
}

#[derive(Deserialize)]
struct CommitNode {
    commit: CommitStatusNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitStatusNode {
    status_check_rollup: Option<RollupNode>,
}

#[derive(Deserialize)]
struct RollupNode {
    state: StatusState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewThreadsNode {
    review_threads: PagedNodes<ThreadNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadNode {
    is_resolved: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestReviewsNode {
    latest_reviews: Option<PagedNodes<ReviewNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewNode {
    state: ReviewState,
    submitted_at: Option<DateTime<Utc>>,
    url: String,
    author: Option<ReviewAuthor>,
}

#[derive(Deserialize)]
struct ReviewAuthor {
    #[serde(rename = "__typename")]
    typename: String,
    login: Option<String>,
}

impl ReviewAuthor {
    /// Login, but only for real user accounts
    fn user_login(self) -> Option<String> {
        if self.typename == "User" {
            self.login
        } else {
            None
        }
    }
}

#[derive(Deserialize)]
struct OrganizationData {
    organization: Option<OrganizationNode>,
}

#[derive(Deserialize)]
struct OrganizationNode {
    team: Option<TeamNode>,
}

#[derive(Deserialize)]
struct TeamNode {
    members: PagedNodes<ActorNode>,
}

#[derive(Deserialize)]
struct CollaboratorsNode {
    collaborators: Option<CollaboratorConnection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollaboratorConnection {
    edges: Option<Vec<Option<CollaboratorEdge>>>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
struct CollaboratorEdge {
    permission: RepositoryPermission,
    node: ActorNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestsNode {
    pull_requests: PullRequestConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestConnection {
    total_count: u64,
    nodes: Option<Vec<Option<GraphQlPullRequestInfo>>>,
    page_info: PageInfo,
}

fn pr_context(pr_number: u64) -> String {
    format!("PR #{pr_number}")
}

#[derive(Deserialize)]
struct LabelsNode {
    labels: Option<PagedNodes<LabelNode>>,
}

/// Label names of one page, plus the cursor of the next page if any
fn label_page(
    pr_number: u64,
    labels: Option<PagedNodes<LabelNode>>,
) -> Result<(Vec<String>, Option<String>)> {
    let labels = labels.ok_or_else(|| Error::missing(pr_context(pr_number), "label list"))?;
    let nodes = labels
        .nodes
        .ok_or_else(|| Error::missing(pr_context(pr_number), "label list"))?;
    let names = present(nodes).map(|l| l.name).collect();
    Ok((names, labels.page_info.next_cursor()))
}

/// Helper to convert a GraphQL PR node to our `PullRequestInfo` type
///
/// Also returns the cursor of the next label page when the PR has more
/// labels than the first page holds.
fn info_from_graphql(pr: GraphQlPullRequestInfo) -> Result<(PullRequestInfo, Option<String>)> {
    let (labels, more_labels) = label_page(pr.number, pr.labels)?;

    let info = PullRequestInfo {
        number: pr.number,
        title: pr.title,
        url: pr.url,
        state: pr.state,
        is_draft: pr.is_draft,
        labels,
        author_login: pr.author.map(|a| a.login),
    };
    Ok((info, more_labels))
}

/// GitHub service using octocrab's GraphQL endpoint
pub struct GitHubService {
    client: Octocrab,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `host` selects a GitHub Enterprise instance; `None` means github.com.
    pub fn new(token: &str, host: Option<String>) -> Result<Self> {
        let base_uri = host.map(|h| format!("https://{h}/api"));
        Self::build(token, base_uri.as_deref())
    }

    /// Create a service talking to an explicit API base URI
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        Self::build(token, Some(base_uri))
    }

    fn build(token: &str, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }
        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;
        Ok(Self { client })
    }

    /// Run one GraphQL operation and unwrap its payload
    async fn query<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        debug!(operation, "running GraphQL query");
        let response: GraphQlResponse = self
            .client
            .graphql(&json!({
                "query": query,
                "operationName": operation,
                "variables": variables,
            }))
            .await?;
        response.decode(operation)
    }

    /// Run a query rooted at `repository.pullRequest` and return the PR node
    async fn query_pull_request<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        owner: &str,
        repo: &str,
        pr_number: u64,
        extra: Value,
    ) -> Result<T> {
        let mut variables = json!({
            "owner": owner,
            "name": repo,
            "number": pr_number,
        });
        if let (Some(vars), Value::Object(extra)) = (variables.as_object_mut(), extra) {
            vars.extend(extra);
        }

        let data: RepositoryData<PullRequestData<T>> =
            self.query(operation, query, variables).await?;
        data.repository
            .ok_or_else(|| Error::NotFound(format!("repository {owner}/{repo}")))?
            .pull_request
            .ok_or_else(|| Error::NotFound(format!("pull request #{pr_number} in {owner}/{repo}")))
    }

    /// Fetch the label pages after `after` and append them to `info.labels`
    async fn complete_labels(
        &self,
        owner: &str,
        repo: &str,
        info: &mut PullRequestInfo,
        mut after: Option<String>,
    ) -> Result<()> {
        while let Some(cursor) = after {
            debug!(pr_number = info.number, "fetching more labels");
            let pr: LabelsNode = self
                .query_pull_request(
                    "GetPullRequestLabels",
                    PULL_REQUEST_LABELS_QUERY,
                    owner,
                    repo,
                    info.number,
                    json!({ "first": PAGE_SIZE, "after": cursor }),
                )
                .await?;
            let (names, next) = label_page(info.number, pr.labels)?;
            info.labels.extend(names);
            after = next;
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn fetch_pull_request_info(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<PullRequestInfo> {
        debug!(pr_number, "fetching PR info");
        let query = format!("{PULL_REQUEST_INFO_QUERY}{PULL_REQUEST_INFO_FRAGMENT}");
        let pr: GraphQlPullRequestInfo = self
            .query_pull_request("GetPullRequestInfo", &query, owner, repo, pr_number, json!({}))
            .await?;
        let (mut info, more_labels) = info_from_graphql(pr)?;
        self.complete_labels(owner, repo, &mut info, more_labels).await?;
        Ok(info)
    }

    async fn fetch_mergeability(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<MergeableState> {
        debug!(pr_number, "fetching mergeability");
        let pr: MergeableNode = self
            .query_pull_request(
                "GetMergeability",
                MERGEABILITY_QUERY,
                owner,
                repo,
                pr_number,
                json!({}),
            )
            .await?;
        let mergeable = pr
            .mergeable
            .ok_or_else(|| Error::missing(pr_context(pr_number), "mergeable state"))?;
        debug!(pr_number, ?mergeable, "fetched mergeability");
        Ok(mergeable)
    }

    async fn fetch_latest_commit_status(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<StatusState> {
        debug!(pr_number, "fetching latest commit status");
        let pr: CommitsNode = self
            .query_pull_request(
                "GetLatestCommitStatus",
                LATEST_COMMIT_STATUS_QUERY,
                owner,
                repo,
                pr_number,
                json!({}),
            )
            .await?;

        let context = pr_context(pr_number);
        let latest = pr
            .commits
            .nodes
            .ok_or_else(|| Error::missing(&context, "commit list"))?
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| Error::missing(&context, "latest commit"))?;
        let state = latest
            .commit
            .status_check_rollup
            .ok_or_else(|| Error::missing(&context, "status check rollup of the latest commit"))?
            .state;

        debug!(pr_number, ?state, "fetched latest commit status");
        Ok(state)
    }

    async fn fetch_review_thread_counts(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<ThreadCounts> {
        debug!(pr_number, "fetching review threads");
        let context = pr_context(pr_number);
        let mut counts = ThreadCounts::default();
        let mut after: Option<String> = None;

        loop {
            let pr: ReviewThreadsNode = self
                .query_pull_request(
                    "GetReviewThreads",
                    REVIEW_THREADS_QUERY,
                    owner,
                    repo,
                    pr_number,
                    json!({ "first": PAGE_SIZE, "after": after }),
                )
                .await?;

            let page = pr.review_threads;
            let nodes = page
                .nodes
                .ok_or_else(|| Error::missing(&context, "review thread list"))?;
            for thread in present(nodes) {
                if thread.is_resolved {
                    counts.resolved += 1;
                } else {
                    counts.unresolved += 1;
                }
            }

            match page.page_info.next_cursor() {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        debug!(
            pr_number,
            resolved = counts.resolved,
            unresolved = counts.unresolved,
            "fetched review threads"
        );
        Ok(counts)
    }

    async fn fetch_latest_reviews(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>> {
        debug!(pr_number, "fetching latest reviews");
        let context = pr_context(pr_number);
        let mut reviews = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let pr: LatestReviewsNode = self
                .query_pull_request(
                    "GetLatestReviews",
                    LATEST_REVIEWS_QUERY,
                    owner,
                    repo,
                    pr_number,
                    json!({ "first": PAGE_SIZE, "after": after }),
                )
                .await?;

            let page = pr
                .latest_reviews
                .ok_or_else(|| Error::missing(&context, "latest review list"))?;
            let nodes = page
                .nodes
                .ok_or_else(|| Error::missing(&context, "latest review nodes"))?;

            for node in present(nodes) {
                // Unsubmitted reviews have no timestamp and cannot affect the decision
                let Some(submitted_at) = node.submitted_at else {
                    debug!(pr_number, url = %node.url, "skipping unsubmitted review");
                    continue;
                };
                reviews.push(Review {
                    state: node.state,
                    submitted_at,
                    author_login: node.author.and_then(ReviewAuthor::user_login),
                    url: node.url,
                });
            }

            match page.page_info.next_cursor() {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        debug!(pr_number, count = reviews.len(), "fetched latest reviews");
        Ok(reviews)
    }

    async fn fetch_team_members(
        &self,
        organization: &str,
        team_slug: &str,
    ) -> Result<Vec<String>> {
        debug!(organization, team_slug, "fetching team members");
        let mut members = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let data: OrganizationData = self
                .query(
                    "GetTeamMembers",
                    TEAM_MEMBERS_QUERY,
                    json!({
                        "organization": organization,
                        "team": team_slug,
                        "first": PAGE_SIZE,
                        "after": after,
                    }),
                )
                .await?;

            let team = data
                .organization
                .ok_or_else(|| Error::NotFound(format!("organization {organization}")))?
                .team
                .ok_or_else(|| {
                    Error::NotFound(format!("team {team_slug} in organization {organization}"))
                })?;
            let nodes = team.members.nodes.ok_or_else(|| {
                Error::missing(format!("team {organization}/{team_slug}"), "member list")
            })?;
            members.extend(present(nodes).map(|m| m.login));

            match team.members.page_info.next_cursor() {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        debug!(organization, team_slug, count = members.len(), "fetched team members");
        Ok(members)
    }

    async fn fetch_collaborators(&self, owner: &str, repo: &str) -> Result<Vec<Collaborator>> {
        debug!(owner, repo, "fetching collaborators");
        let context = format!("repository {owner}/{repo}");
        let mut collaborators = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let data: RepositoryData<CollaboratorsNode> = self
                .query(
                    "GetCollaborators",
                    COLLABORATORS_QUERY,
                    json!({
                        "owner": owner,
                        "name": repo,
                        "first": PAGE_SIZE,
                        "after": after,
                    }),
                )
                .await?;

            let connection = data
                .repository
                .ok_or_else(|| Error::NotFound(context.clone()))?
                .collaborators
                .ok_or_else(|| Error::missing(&context, "collaborator list"))?;
            let edges = connection
                .edges
                .ok_or_else(|| Error::missing(&context, "collaborator edges"))?;
            collaborators.extend(present(edges).map(|edge| Collaborator {
                login: edge.node.login,
                permission: edge.permission,
            }));

            match connection.page_info.next_cursor() {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        debug!(owner, repo, count = collaborators.len(), "fetched collaborators");
        Ok(collaborators)
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        labels: &[String],
        page_size: u32,
        after: Option<&str>,
    ) -> Result<PullRequestPage> {
        debug!(owner, repo, ?labels, page_size, "listing pull requests");
        let query = format!("{LIST_PULL_REQUESTS_QUERY}{PULL_REQUEST_INFO_FRAGMENT}");
        let labels = if labels.is_empty() {
            Value::Null
        } else {
            json!(labels)
        };

        let data: RepositoryData<PullRequestsNode> = self
            .query(
                "ListPullRequests",
                &query,
                json!({
                    "owner": owner,
                    "name": repo,
                    "first": page_size,
                    "after": after,
                    "labels": labels,
                }),
            )
            .await?;

        let connection = data
            .repository
            .ok_or_else(|| Error::NotFound(format!("repository {owner}/{repo}")))?
            .pull_requests;
        let nodes = connection.nodes.ok_or_else(|| {
            Error::missing(format!("repository {owner}/{repo}"), "pull request list")
        })?;

        let mut entries = Vec::new();
        for node in present(nodes) {
            let (mut info, more_labels) = info_from_graphql(node)?;
            self.complete_labels(owner, repo, &mut info, more_labels).await?;
            entries.push(info);
        }
        entries.sort_by_key(|pr| pr.number);

        debug!(count = entries.len(), total = connection.total_count, "listed pull requests");
        Ok(PullRequestPage {
            entries,
            total_count: connection.total_count,
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        })
    }
}
