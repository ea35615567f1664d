//! Errors raised by backend calls.

use thiserror::Error;

/// A failed remote call.
///
/// The `Display` output is what the user sees, so API errors carry the
/// backend's message untouched.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend rejected the request.
    #[error("{0}")]
    Api(String),
    /// No session is available for a call that needs one.
    #[error("User not authenticated")]
    NotAuthenticated,
    /// Transport failure.
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    /// The response body did not match the expected shape.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
    /// Local session storage failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The configured backend URL cannot be used.
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T, E = BackendError> = std::result::Result<T, E>;
