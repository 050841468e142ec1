//! Authentication for GitHub
//!
//! Resolves an existing token from environment variables or the `gh` CLI.
//! Issuing tokens is left to those tools.

mod github;

pub use github::{GitHubAuthConfig, get_github_auth, token_from_env};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh)
    Cli,
    /// Token from environment variable
    EnvVar,
}
