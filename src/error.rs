// Error types for the backend client. Every failure of a client operation
// maps to exactly one of these variants so callers can tell a dead network
// apart from a backend that answered with an error or with garbage.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`crate::api::ApiClient`] and the token store.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The API key or session token cannot be sent as a header value.
    #[error("invalid value for header {name}")]
    InvalidHeader { name: &'static str },

    /// The request never completed (DNS, connect, TLS, or body read).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status.
    #[error("{endpoint} returned {status}: {detail}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        detail: String,
    },

    /// A 2xx body that is not JSON or is missing a required field.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        endpoint: &'static str,
        reason: String,
    },

    #[error("token store at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status of a `Status` error, if that is what this is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
