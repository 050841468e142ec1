//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use gatekeep::error::{Error, Result};
use gatekeep::platform::PlatformService;
use gatekeep::types::{
    Collaborator, MergeableState, PullRequestInfo, PullRequestPage, Review, StatusState,
    ThreadCounts,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Platform method names, used for call tracking and error injection
pub mod method {
    pub const PR_INFO: &str = "fetch_pull_request_info";
    pub const MERGEABILITY: &str = "fetch_mergeability";
    pub const COMMIT_STATUS: &str = "fetch_latest_commit_status";
    pub const THREAD_COUNTS: &str = "fetch_review_thread_counts";
    pub const LATEST_REVIEWS: &str = "fetch_latest_reviews";
    pub const TEAM_MEMBERS: &str = "fetch_team_members";
    pub const COLLABORATORS: &str = "fetch_collaborators";
    pub const LIST_PRS: &str = "list_pull_requests";
}

/// Call record for `list_pull_requests`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPrsCall {
    pub labels: Vec<String>,
    pub page_size: u32,
    pub after: Option<String>,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Configurable responses per PR number
/// - Call tracking for verification
/// - Error injection for failure path testing
///
/// A PR-scoped method without a configured response fails with
/// `Error::NotFound`, like a PR that does not exist.
#[derive(Default)]
pub struct MockPlatformService {
    info_responses: Mutex<HashMap<u64, PullRequestInfo>>,
    mergeability_responses: Mutex<HashMap<u64, MergeableState>>,
    status_responses: Mutex<HashMap<u64, StatusState>>,
    thread_responses: Mutex<HashMap<u64, ThreadCounts>>,
    review_responses: Mutex<HashMap<u64, Vec<Review>>>,
    team_members: Mutex<Vec<String>>,
    collaborators: Mutex<Vec<Collaborator>>,
    list_responses: Mutex<HashMap<Option<String>, PullRequestPage>>,
    // Call tracking
    calls: Mutex<Vec<&'static str>>,
    list_prs_calls: Mutex<Vec<ListPrsCall>>,
    // Error injection, keyed by method name
    errors: Mutex<HashMap<&'static str, String>>,
}

impl MockPlatformService {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    // === Error injection methods ===

    /// Make `method` return `Error::Platform(msg)`
    pub fn fail(&self, method: &'static str, msg: &str) {
        self.errors.lock().unwrap().insert(method, msg.to_string());
    }

    /// Make `fetch_latest_commit_status` return an error
    pub fn fail_commit_status(&self, msg: &str) {
        self.fail(method::COMMIT_STATUS, msg);
    }

    /// Make `fetch_collaborators` return an error
    pub fn fail_collaborators(&self, msg: &str) {
        self.fail(method::COLLABORATORS, msg);
    }

    // === Response setters ===

    /// Set the response for `fetch_pull_request_info`
    pub fn set_info(&self, info: PullRequestInfo) {
        self.info_responses.lock().unwrap().insert(info.number, info);
    }

    /// Set the response for `fetch_mergeability`
    pub fn set_mergeability(&self, pr_number: u64, state: MergeableState) {
        self.mergeability_responses
            .lock()
            .unwrap()
            .insert(pr_number, state);
    }

    /// Set the response for `fetch_latest_commit_status`
    pub fn set_status(&self, pr_number: u64, state: StatusState) {
        self.status_responses
            .lock()
            .unwrap()
            .insert(pr_number, state);
    }

    /// Set the response for `fetch_review_thread_counts`
    pub fn set_threads(&self, pr_number: u64, threads: ThreadCounts) {
        self.thread_responses
            .lock()
            .unwrap()
            .insert(pr_number, threads);
    }

    /// Set the response for `fetch_latest_reviews`
    pub fn set_reviews(&self, pr_number: u64, reviews: Vec<Review>) {
        self.review_responses
            .lock()
            .unwrap()
            .insert(pr_number, reviews);
    }

    /// Set the response for `fetch_team_members`
    pub fn set_team_members(&self, logins: &[&str]) {
        *self.team_members.lock().unwrap() = logins.iter().map(ToString::to_string).collect();
    }

    /// Set the response for `fetch_collaborators`
    pub fn set_collaborators(&self, collaborators: Vec<Collaborator>) {
        *self.collaborators.lock().unwrap() = collaborators;
    }

    /// Set the page returned by `list_pull_requests` for a cursor
    pub fn set_list_page(&self, after: Option<&str>, page: PullRequestPage) {
        self.list_responses
            .lock()
            .unwrap()
            .insert(after.map(ToString::to_string), page);
    }

    /// Helper to set up an open, mergeable, green PR with no threads
    pub fn setup_clean_pr(&self, pr_number: u64, labels: &[&str], reviews: Vec<Review>) {
        self.set_info(PullRequestInfo {
            number: pr_number,
            title: format!("Mapping update {pr_number}"),
            url: format!("https://github.com/acme/widgets/pull/{pr_number}"),
            state: gatekeep::types::PrState::Open,
            is_draft: false,
            labels: labels.iter().map(ToString::to_string).collect(),
            author_login: Some("author".to_string()),
        });
        self.set_mergeability(pr_number, MergeableState::Mergeable);
        self.set_status(pr_number, StatusState::Success);
        self.set_threads(pr_number, ThreadCounts::default());
        self.set_reviews(pr_number, reviews);
    }

    // === Call tracking ===

    /// Every method called so far, in call order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded `list_pull_requests` calls
    pub fn list_prs_calls(&self) -> Vec<ListPrsCall> {
        self.list_prs_calls.lock().unwrap().clone()
    }

    /// Assert `method` was called exactly `times` times
    pub fn assert_called(&self, method: &str, times: usize) {
        let count = self.calls().iter().filter(|m| **m == method).count();
        assert_eq!(count, times, "expected {method} to be called {times} times");
    }

    fn enter(&self, method: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(method);
        match self.errors.lock().unwrap().get(method) {
            Some(msg) => Err(Error::Platform(msg.clone())),
            None => Ok(()),
        }
    }

    fn pr_response<T: Clone>(map: &Mutex<HashMap<u64, T>>, pr_number: u64) -> Result<T> {
        map.lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("pull request #{pr_number}")))
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn fetch_pull_request_info(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> Result<PullRequestInfo> {
        self.enter(method::PR_INFO)?;
        Self::pr_response(&self.info_responses, pr_number)
    }

    async fn fetch_mergeability(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> Result<MergeableState> {
        self.enter(method::MERGEABILITY)?;
        Self::pr_response(&self.mergeability_responses, pr_number)
    }

    async fn fetch_latest_commit_status(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> Result<StatusState> {
        self.enter(method::COMMIT_STATUS)?;
        Self::pr_response(&self.status_responses, pr_number)
    }

    async fn fetch_review_thread_counts(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> Result<ThreadCounts> {
        self.enter(method::THREAD_COUNTS)?;
        Self::pr_response(&self.thread_responses, pr_number)
    }

    async fn fetch_latest_reviews(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>> {
        self.enter(method::LATEST_REVIEWS)?;
        Self::pr_response(&self.review_responses, pr_number)
    }

    async fn fetch_team_members(
        &self,
        _organization: &str,
        _team_slug: &str,
    ) -> Result<Vec<String>> {
        self.enter(method::TEAM_MEMBERS)?;
        Ok(self.team_members.lock().unwrap().clone())
    }

    async fn fetch_collaborators(&self, _owner: &str, _repo: &str) -> Result<Vec<Collaborator>> {
        self.enter(method::COLLABORATORS)?;
        Ok(self.collaborators.lock().unwrap().clone())
    }

    async fn list_pull_requests(
        &self,
        _owner: &str,
        _repo: &str,
        labels: &[String],
        page_size: u32,
        after: Option<&str>,
    ) -> Result<PullRequestPage> {
        self.list_prs_calls.lock().unwrap().push(ListPrsCall {
            labels: labels.to_vec(),
            page_size,
            after: after.map(ToString::to_string),
        });
        self.enter(method::LIST_PRS)?;
        Ok(self
            .list_responses
            .lock()
            .unwrap()
            .get(&after.map(ToString::to_string))
            .cloned()
            .unwrap_or_default())
    }
}
