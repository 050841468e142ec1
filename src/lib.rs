//! gatekeep - merge-readiness decisions for reviewed GitHub pull requests
//!
//! A pull request becomes mergeable a fixed waiting period after it has
//! collected enough approvals, including one from a designated reviewer, as
//! long as no privileged reviewer is requesting changes. This crate fetches
//! the data for that rule from GitHub and computes the decision.

pub mod auth;
pub mod config;
pub mod error;
pub mod permissions;
pub mod platform;
pub mod readiness;
pub mod types;
