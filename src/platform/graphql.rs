//! GraphQL response envelope and shared response shapes

use crate::error::{Error, RemoteError, RemoteErrors, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Error `type` GitHub reports when a looked-up entity does not exist
const NOT_FOUND_TYPE: &str = "NOT_FOUND";

/// Top-level GraphQL response
///
/// The payload stays untyped (`Value`) until the error list has been looked
/// at; see [`GraphQlResponse::decode`].
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T = Value> {
    /// Payload, absent when the whole operation failed
    pub data: Option<T>,
    /// Operation-level errors
    pub errors: Option<Vec<RemoteError>>,
}

impl<T> GraphQlResponse<T> {
    /// Unwrap the payload of `operation`, turning reported errors into `Error`
    ///
    /// Responses whose errors are all `NOT_FOUND` become [`Error::NotFound`];
    /// any other errors are aggregated into [`Error::Remote`].
    pub fn into_data(self, operation: &str) -> Result<T> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            if errors.iter().all(is_not_found) {
                let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
                return Err(Error::NotFound(messages.join("; ")));
            }
            return Err(RemoteErrors {
                operation: operation.to_string(),
                errors,
            }
            .into());
        }

        self.data
            .ok_or_else(|| Error::missing(format!("operation {operation}"), "response data"))
    }
}

impl GraphQlResponse {
    /// Check reported errors, then decode the payload into `T`
    ///
    /// A payload that does not fit `T` is [`Error::UnexpectedData`].
    pub fn decode<T: DeserializeOwned>(self, operation: &str) -> Result<T> {
        let data = self.into_data(operation)?;
        serde_json::from_value(data).map_err(|e| Error::UnexpectedData {
            context: format!("operation {operation}"),
            detail: e.to_string(),
        })
    }
}

fn is_not_found(error: &RemoteError) -> bool {
    error
        .attributes
        .get("type")
        .and_then(serde_json::Value::as_str)
        == Some(NOT_FOUND_TYPE)
}

/// Cursor pagination state of a connection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether more items follow
    pub has_next_page: bool,
    /// Cursor of the last item on this page
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Cursor to request the next page with, if there is one
    pub fn next_cursor(&self) -> Option<String> {
        if self.has_next_page {
            self.end_cursor.clone()
        } else {
            None
        }
    }
}

/// `repository(owner:, name:)` wrapper
#[derive(Debug, Deserialize)]
pub(super) struct RepositoryData<T> {
    pub repository: Option<T>,
}

/// `pullRequest(number:)` wrapper
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PullRequestData<T> {
    pub pull_request: Option<T>,
}

/// Drop null entries from a nullable list of nullable nodes
pub(super) fn present<T>(nodes: Vec<Option<T>>) -> impl Iterator<Item = T> {
    nodes.into_iter().flatten()
}
