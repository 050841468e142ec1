//! Error types for gatekeep

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while fetching data or deciding on a pull request
#[derive(Error, Debug)]
pub enum Error {
    /// A required field of a fetched response was null or absent
    #[error("{field} is missing for {context}")]
    MissingData {
        /// What was being fetched (e.g. "PR #12")
        context: String,
        /// Name of the absent field
        field: String,
    },

    /// A response field has a value this crate cannot interpret
    #[error("unexpected data for {context}: {detail}")]
    UnexpectedData {
        /// What was being fetched (e.g. "operation GetMergeability")
        context: String,
        /// Decoder message naming the offending value
        detail: String,
    },

    /// The API answered, but flagged operation-level errors
    #[error(transparent)]
    Remote(#[from] RemoteErrors),

    /// Organization, repository, team or pull request does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Network / HTTP failure from the GitHub client
    #[error("GitHub transport error: {0}")]
    Transport(#[from] octocrab::Error),

    /// Other GitHub API failure (client construction, unexpected response)
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable authentication token
    #[error("authentication error: {0}")]
    Auth(String),

    /// Generic platform failure (used by alternative platform services)
    #[error("platform error: {0}")]
    Platform(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a [`Error::MissingData`] error
    pub fn missing(context: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingData {
            context: context.into(),
            field: field.into(),
        }
    }

    /// Whether this is a network-level failure rather than a data-shape problem
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::GitHubApi(_))
    }

    /// Whether a required field was absent from an otherwise successful response
    pub const fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingData { .. })
    }

    /// Whether the response arrived but did not have the expected shape
    pub const fn is_data_shape(&self) -> bool {
        matches!(self, Self::MissingData { .. } | Self::UnexpectedData { .. })
    }
}

/// Source position of a GraphQL error
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorLocation {
    /// 1-based line in the query document
    pub line: u32,
    /// 1-based column in the query document
    pub column: u32,
}

/// A single error entry of a GraphQL response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteError {
    /// Human-readable message
    pub message: String,
    /// Where in the query the error applies
    #[serde(default)]
    pub locations: Vec<ErrorLocation>,
    /// Any other attributes (`type`, `path`, `extensions`, ...)
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// All errors reported by one GraphQL operation
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteErrors {
    /// Name of the failed operation
    pub operation: String,
    /// The reported errors, in response order
    pub errors: Vec<RemoteError>,
}

impl fmt::Display for RemoteErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation {} has errors", self.operation)?;
        for error in &self.errors {
            write!(f, "\n{}", error.message)?;
            for location in &error.locations {
                write!(
                    f,
                    "\n    at line {}, column {}",
                    location.line, location.column
                )?;
            }
            for (key, value) in &error.attributes {
                write!(f, "\n    with {key} as {value}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for RemoteErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors_display_lists_every_diagnostic() {
        let errors: Vec<RemoteError> = serde_json::from_value(serde_json::json!([
            {
                "message": "Field 'foo' doesn't exist",
                "locations": [{ "line": 3, "column": 7 }],
                "type": "undefinedField"
            },
            { "message": "Something else" }
        ]))
        .unwrap();

        let err = RemoteErrors {
            operation: "GetPullRequest".to_string(),
            errors,
        };

        assert_eq!(
            err.to_string(),
            "operation GetPullRequest has errors\n\
             Field 'foo' doesn't exist\n    at line 3, column 7\n    with type as \"undefinedField\"\n\
             Something else"
        );
    }

    #[test]
    fn test_error_kind_predicates() {
        assert!(Error::missing("PR #3", "commits").is_missing_data());
        assert!(!Error::missing("PR #3", "commits").is_transport());
        assert!(Error::GitHubApi("boom".to_string()).is_transport());
        assert!(!Error::NotFound("team x".to_string()).is_transport());
    }

    #[test]
    fn test_missing_data_message_names_field_and_context() {
        let err = Error::missing("PR #42", "status check rollup of the latest commit");
        assert_eq!(
            err.to_string(),
            "status check rollup of the latest commit is missing for PR #42"
        );
    }
}
