use std::time::Duration;
use thiserror::Error;

/// Connection-level failures raised by a transport.
///
/// HTTP status codes are not errors at this layer: any response that made it
/// back from the server is returned as a [`RawResponse`](crate::RawResponse)
/// and classified by the caller.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// The request did not complete within the configured timeout
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The connection to the tenant could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request URL could not be built from the base URL and path
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL that failed to parse
        url: String,
        /// Diagnostic message (unstable format, for logging only)
        reason: String,
    },

    /// The request payload could not be serialized
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The underlying HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// Any other transport failure, with the original error as source
    #[error("transport error: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Whether this error represents an expired request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fmt;

    #[derive(Debug)]
    struct Reset;

    impl fmt::Display for Reset {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection reset by peer")
        }
    }

    impl Error for Reset {}

    #[test]
    fn timeout_renders_millis() {
        let err = TransportError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "request timed out after 5000ms");
        assert!(err.is_timeout());
    }

    #[test]
    fn other_preserves_source() {
        let err = TransportError::Other(Box::new(Reset));
        let source = err.source().expect("source must be kept");
        assert!(source.downcast_ref::<Reset>().is_some());
        assert!(!err.is_timeout());
    }
}
