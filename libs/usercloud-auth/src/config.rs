use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::TokenError;

pub const DEFAULT_TOKEN_PATH: &str = "/oidc/token";
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(5);
pub const DEFAULT_FALLBACK_TTL: Duration = Duration::from_secs(300);

/// Settings for acquiring and caching access tokens.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenConfig {
    /// Token endpoint, relative to the tenant URL.
    pub token_path: String,

    /// A cached token is refreshed once it is this close to expiry.
    #[serde(with = "humantime_serde")]
    pub refresh_margin: Duration,

    /// Lifetime assumed when the response carries neither `expires_in` nor
    /// a JWT `exp` claim.
    #[serde(with = "humantime_serde")]
    pub fallback_ttl: Duration,

    /// Extra headers sent with every token request.
    #[serde(skip)]
    pub extra_headers: Vec<(String, String)>,
}

impl TokenConfig {
    /// # Errors
    /// Returns [`TokenError::Config`] for an empty token path or a zero TTL.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.token_path.trim().is_empty() {
            return Err(TokenError::Config("token_path must not be empty".into()));
        }
        if self.fallback_ttl.is_zero() {
            return Err(TokenError::Config("fallback_ttl must be positive".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_extra_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            token_path: DEFAULT_TOKEN_PATH.to_owned(),
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            fallback_ttl: DEFAULT_FALLBACK_TTL,
            extra_headers: Vec::new(),
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<_> = self.extra_headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("TokenConfig")
            .field("token_path", &self.token_path)
            .field("refresh_margin", &self.refresh_margin)
            .field("fallback_ttl", &self.fallback_ttl)
            .field("extra_headers", &header_names)
            .finish()
    }
}
