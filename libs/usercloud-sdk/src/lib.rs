#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Client SDK for the `UserClouds` tenant APIs
//!
//! Two facades expose the same operations:
//! - [`Client`] returns futures and never blocks a runtime thread
//! - [`BlockingClient`] blocks the calling thread for each round trip
//!
//! Both validate arguments locally, attach a cached bearer token (refreshed
//! on demand, one exchange at a time), send the request through a
//! [`usercloud_http`] transport and decode the response into the types in
//! [`models`]. Failures surface as [`Error`].
//!
//! # Example
//!
//! ```ignore
//! use usercloud_sdk::{Client, ClientConfig, models::{ListOptions, Purpose}};
//!
//! let client = Client::new(
//!     ClientConfig::builder()
//!         .tenant_url("https://acme.tenant.userclouds.com")
//!         .client_id(client_id)
//!         .client_secret(client_secret)
//!         .build()?,
//! )?;
//!
//! let purpose = client
//!     .create_purpose(Purpose { name: "marketing".into(), ..Purpose::default() }, true)
//!     .await?;
//! let page = client.list_purposes(ListOptions::default().with_limit(50)).await?;
//! // DELETE of a missing resource is not an error
//! let deleted = client.delete_purpose(purpose.id).await?;
//! ```

pub mod error;
pub mod models;

mod config;
mod headers;
mod response;

#[macro_use]
mod operations;

mod blocking;
mod client;

pub use blocking::BlockingClient;
pub use client::Client;
pub use config::{
    CLIENT_ID_VARS, CLIENT_SECRET_VARS, ClientConfig, ClientConfigBuilder, EnvLookup,
    TENANT_URL_VARS,
};
pub use error::Error;
pub use headers::{SDK_VERSION, SDK_VERSION_HEADER, SdkHeaders};
pub use operations::LIST_VERSION;
pub use response::identical_conflict_id;

pub use usercloud_auth::{Credentials, SecretString, TokenConfig};
pub use usercloud_http::{
    AsyncTransport, BlockingTransport, Method, RawResponse, RequestDescriptor, TransportConfig,
    TransportError,
};
