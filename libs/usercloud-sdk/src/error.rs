//! SDK error type.
//!
//! Every facade method fails with exactly one of these kinds. None of them is
//! retried inside the SDK.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use usercloud_auth::TokenError;
use usercloud_http::TransportError;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The access token could not be obtained; the operation's own request
    /// was not sent.
    #[error("authentication failed: {0}")]
    Authentication(#[from] TokenError),

    /// Caller input rejected before any network call.
    #[error("invalid argument: {message}")]
    Validation { message: String },

    /// The tenant answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        request_id: Option<String>,
        /// JSON error body, when the server sent one
        body: Option<Value>,
    },

    /// Connection-level failure or timeout.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 2xx body that does not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Missing or malformed client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A downloaded file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// HTTP status of an [`Error::Http`] or a rejected token exchange.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Authentication(e) => e.status(),
            _ => None,
        }
    }

    /// Request id reported by the tenant, useful when contacting support.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Http { request_id, .. }
            | Self::Authentication(TokenError::Rejected { request_id, .. }) => {
                request_id.as_deref()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) | Self::Authentication(TokenError::Transport(e)) => e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn http_error_renders_status_and_message() {
        let err = Error::Http {
            status: 409,
            message: "column already exists".into(),
            request_id: Some("r-1".into()),
            body: None,
        };
        assert_eq!(err.to_string(), "HTTP 409: column already exists");
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.request_id(), Some("r-1"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn authentication_exposes_rejection_details() {
        let err: Error = TokenError::Rejected {
            status: 401,
            error: "invalid_client".into(),
            request_id: Some("kramer".into()),
        }
        .into();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.request_id(), Some("kramer"));
        assert!(
            err.to_string()
                .starts_with("authentication failed: token exchange rejected")
        );
    }

    #[test]
    fn timeout_detection_looks_through_token_errors() {
        let direct: Error = TransportError::Timeout(Duration::from_secs(1)).into();
        assert!(direct.is_timeout());

        let during_auth: Error =
            TokenError::Transport(TransportError::Timeout(Duration::from_secs(1))).into();
        assert!(during_auth.is_timeout());

        assert!(!Error::validation("x").is_timeout());
    }

    #[test]
    fn validation_renders() {
        assert_eq!(
            Error::validation("id must not be nil").to_string(),
            "invalid argument: id must not be nil"
        );
    }
}
