#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Transport layer for the `UserClouds` SDK
//!
//! The SDK never talks to the network directly. It builds a
//! [`RequestDescriptor`] for every call and hands it to a transport:
//! - [`AsyncTransport`] for callers running on an async runtime
//! - [`BlockingTransport`] for callers that block the current thread
//!
//! [`ReqwestTransport`] and [`BlockingReqwestTransport`] are the default
//! implementations. Any type implementing the traits can be substituted, e.g.
//! a recording stub in tests or a transport that adds proxying or retries.
//! The transports shipped here never retry.
//!
//! # Example
//!
//! ```ignore
//! use usercloud_http::{AsyncTransport, RequestDescriptor, ReqwestTransport, TransportConfig};
//!
//! let transport = ReqwestTransport::new(&TransportConfig::new(tenant_url))?;
//! let response = transport
//!     .execute(RequestDescriptor::get("/authn/users").query("version", "3"))
//!     .await?;
//! assert!(response.is_success());
//! ```

mod config;
mod error;
mod request;
mod response;
mod reqwest_transport;
mod transport;

pub use config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST, DEFAULT_TIMEOUT, TransportConfig};
pub use error::TransportError;
pub use request::{
    CONTENT_TYPE, FORM_CONTENT_TYPE, HeaderMap, JSON_CONTENT_TYPE, Method, RequestDescriptor,
};
pub use reqwest_transport::{BlockingReqwestTransport, ReqwestTransport};
pub use response::{ErrorDetails, REQUEST_ID_HEADER, RawResponse};
pub use transport::{AsyncTransport, BlockingTransport};
