//! Client error model.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type used across the client.
pub type ClientResult<T> = Result<T, ClientError>;

pub(crate) const DEFAULT_LOGIN_ERROR: &str = "invalid credentials";
pub(crate) const DEFAULT_REGISTER_ERROR: &str = "registration failed";
pub(crate) const BACKEND_HTML: &str =
    "the server answered with an HTML page instead of JSON; check that the backend application is running and reachable";
pub(crate) const SERVER_UNREACHABLE: &str =
    "could not connect to the server; check that the backend is running";
pub(crate) const REGISTRATION_CHECK_FAILED: &str = "could not verify whether registration is open";

/// Failure surfaced by the auth client or the authenticated request helper.
///
/// Messages are user-facing: "your session ended" (`SessionExpired`) reads
/// differently from "the server is unreachable" (`Connectivity`,
/// `BackendUnavailable`).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    RegistrationFailed(String),

    /// The backend answered with markup where JSON was expected.
    #[error("{0}")]
    BackendUnavailable(String),

    #[error("your session has expired, please log in again")]
    SessionExpired,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("download failed ({status})")]
    Download { status: u16 },

    /// Transport-level failure (DNS, refused connection, timeout, ...).
    #[error("{0}")]
    Connectivity(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid download file name '{0}'")]
    InvalidFilename(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub(crate) fn connectivity(err: reqwest::Error) -> Self {
        tracing::debug!(error = %err, "transport failure");
        Self::Connectivity(SERVER_UNREACHABLE.to_string())
    }

    pub(crate) fn decode(err: impl core::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    /// HTTP status carried by the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired => Some(401),
            Self::Api { status, .. } | Self::Download { status } => Some(*status),
            _ => None,
        }
    }
}
