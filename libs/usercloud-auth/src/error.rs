use thiserror::Error;
use usercloud_http::TransportError;

/// Failures of the client-credentials exchange.
///
/// No variant ever carries the client secret or an access token.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenError {
    /// The token endpoint answered with a non-2xx status.
    #[error("token exchange rejected (HTTP {status}): {error}")]
    Rejected {
        status: u16,
        error: String,
        request_id: Option<String>,
    },

    /// The token endpoint could not be reached.
    #[error("token exchange failed: {0}")]
    Transport(#[from] TransportError),

    /// The token endpoint returned an unparseable or incomplete response.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// The token endpoint returned a `token_type` other than `Bearer`.
    #[error("unsupported token type: {0}")]
    UnsupportedTokenType(String),

    /// Credentials or token settings are unusable.
    #[error("token config error: {0}")]
    Config(String),
}

impl TokenError {
    /// HTTP status of a rejected exchange.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn rejected_renders_status_and_message() {
        let e = TokenError::Rejected {
            status: 401,
            error: "invalid_client".into(),
            request_id: Some("r-1".into()),
        };
        assert_eq!(
            e.to_string(),
            "token exchange rejected (HTTP 401): invalid_client"
        );
        assert_eq!(e.status(), Some(401));
    }

    #[test]
    fn transport_converts() {
        let e: TokenError = TransportError::Timeout(Duration::from_secs(1)).into();
        assert_eq!(
            e.to_string(),
            "token exchange failed: request timed out after 1000ms"
        );
        assert_eq!(e.status(), None);
    }

    #[test]
    fn unsupported_token_type_renders() {
        let e = TokenError::UnsupportedTokenType("mac".into());
        assert_eq!(e.to_string(), "unsupported token type: mac");
    }
}
