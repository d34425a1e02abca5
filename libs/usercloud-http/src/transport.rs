use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::RequestDescriptor;
use crate::response::RawResponse;

/// Performs a single HTTP exchange without blocking the calling thread.
///
/// Implementations return every HTTP response, whatever its status, and only
/// fail on connection-level problems.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    /// # Errors
    /// Returns [`TransportError`] when no response could be obtained.
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError>;
}

/// Blocking counterpart of [`AsyncTransport`].
pub trait BlockingTransport: Send + Sync {
    /// # Errors
    /// Returns [`TransportError`] when no response could be obtained.
    fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError>;
}
