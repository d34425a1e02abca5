#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Access tokens for the `UserClouds` SDK
//!
//! The tenant issues bearer tokens through the `OAuth2` client-credentials
//! grant. [`AsyncTokenManager`] and [`BlockingTokenManager`] fetch a token on
//! first use, cache it, and fetch a new one once the cached token comes within
//! [`TokenConfig::refresh_margin`] of its expiry. There is no background
//! refresh task.
//!
//! Concurrent callers that find the cache stale share one exchange:
//!
//! ```ignore
//! let manager = AsyncTokenManager::new(transport, credentials, TokenConfig::default())?;
//! let (a, b) = tokio::join!(manager.get_valid_token(), manager.get_valid_token());
//! assert_eq!(manager.exchange_count(), 1);
//! ```

mod config;
mod credentials;
mod error;
pub mod exchange;
mod manager;
mod secret;
mod token;

pub use config::{DEFAULT_FALLBACK_TTL, DEFAULT_REFRESH_MARGIN, DEFAULT_TOKEN_PATH, TokenConfig};
pub use credentials::Credentials;
pub use error::TokenError;
pub use manager::{AsyncTokenManager, BlockingTokenManager};
pub use secret::SecretString;
pub use token::AccessToken;
