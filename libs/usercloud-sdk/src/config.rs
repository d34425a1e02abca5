use std::convert::identity;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use url::Url;
use usercloud_auth::{Credentials, SecretString, TokenConfig};
use usercloud_http::{DEFAULT_TIMEOUT, TransportConfig};
use zeroize::Zeroizing;

use crate::error::Error;
use crate::headers::SdkHeaders;

pub const TENANT_URL_VARS: &[&str] = &["USERCLOUDS_TENANT_URL", "TENANT_URL"];
pub const CLIENT_ID_VARS: &[&str] = &["USERCLOUDS_CLIENT_ID", "CLIENT_ID"];
pub const CLIENT_SECRET_VARS: &[&str] = &["USERCLOUDS_CLIENT_SECRET", "CLIENT_SECRET"];

/// Source of environment values, replaceable in tests.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Everything a client needs to reach one tenant.
///
/// Deserializable so applications can keep it in their own config files:
///
/// ```yaml
/// tenant_url: https://acme.tenant.userclouds.com
/// client_id: 5f1e...
/// client_secret: s3cr3t
/// session_name: billing-worker
/// timeout: 10s
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub tenant_url: Url,

    #[serde(flatten)]
    pub credentials: Credentials,

    /// Appended to the user agent for server-side diagnostics.
    #[serde(default)]
    pub session_name: Option<String>,

    /// Per-request timeout, `None` waits indefinitely.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Skip TLS verification. Never enable outside local development.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default)]
    pub token: TokenConfig,
}

const DEFAULT_CLIENT_TIMEOUT: Option<Duration> = Some(DEFAULT_TIMEOUT);

const fn default_timeout() -> Option<Duration> {
    DEFAULT_CLIENT_TIMEOUT
}

impl ClientConfig {
    #[must_use]
    pub fn new(tenant_url: Url, credentials: Credentials) -> Self {
        Self {
            tenant_url,
            credentials,
            session_name: None,
            timeout: default_timeout(),
            accept_invalid_certs: false,
            token: TokenConfig::default(),
        }
    }

    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Configuration taken entirely from the environment.
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first variable that is missing or
    /// malformed.
    pub fn from_env() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// # Errors
    /// Returns [`Error::Config`] for a non-HTTP tenant URL, blank credentials
    /// or invalid token settings.
    pub fn validate(&self) -> Result<(), Error> {
        check_tenant_url(&self.tenant_url)?;
        self.credentials
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;
        self.token
            .validate()
            .map_err(|e| Error::Config(e.to_string()))
    }

    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(self.tenant_url.clone())
            .with_timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
    }

    #[must_use]
    pub fn sdk_headers(&self) -> SdkHeaders {
        SdkHeaders::new(self.session_name.as_deref())
    }

    /// Token settings with the identification headers added, so the token
    /// exchange is attributed like any other request.
    #[must_use]
    pub fn token_config(&self) -> TokenConfig {
        self.sdk_headers()
            .identification()
            .into_iter()
            .fold(self.token.clone(), |config, (name, value)| {
                config.with_extra_header(name, value)
            })
    }
}

fn check_tenant_url(url: &Url) -> Result<(), Error> {
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        _ => Err(Error::Config(format!(
            "tenant URL must be an http(s) URL with a host, got '{url}'"
        ))),
    }
}

/// Builds a [`ClientConfig`] from explicit values, falling back to the
/// environment for the tenant URL and credentials.
///
/// Explicit values always win. Each setting is looked up under its
/// `USERCLOUDS_` name first and then under the legacy unprefixed name; a value
/// found only under the legacy name is accepted with a warning.
pub struct ClientConfigBuilder {
    tenant_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    session_name: Option<String>,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
    token: TokenConfig,
    env: EnvLookup,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            tenant_url: None,
            client_id: None,
            client_secret: None,
            session_name: None,
            timeout: default_timeout(),
            accept_invalid_certs: false,
            token: TokenConfig::default(),
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn tenant_url(mut self, url: impl Into<String>) -> Self {
        self.tenant_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn client_secret(mut self, secret: impl Into<SecretString>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    #[must_use]
    pub fn session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    #[must_use]
    pub fn token_config(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Replace the environment, e.g. with a map in tests.
    #[must_use]
    pub fn env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env = Arc::new(lookup);
        self
    }

    /// # Errors
    /// Returns [`Error::Config`] when a required value is neither set
    /// explicitly nor present in the environment, or is invalid.
    pub fn build(self) -> Result<ClientConfig, Error> {
        let raw_url = self
            .tenant_url
            .or_else(|| lookup_env(&*self.env, TENANT_URL_VARS, identity))
            .ok_or_else(|| missing("tenant URL", TENANT_URL_VARS))?;
        let tenant_url = Url::parse(raw_url.trim())
            .map_err(|e| Error::Config(format!("invalid tenant URL '{raw_url}': {e}")))?;

        let client_id = self
            .client_id
            .or_else(|| lookup_env(&*self.env, CLIENT_ID_VARS, identity))
            .ok_or_else(|| missing("client id", CLIENT_ID_VARS))?;
        let client_secret = self
            .client_secret
            .or_else(|| lookup_env(&*self.env, CLIENT_SECRET_VARS, SecretString::from))
            .ok_or_else(|| missing("client secret", CLIENT_SECRET_VARS))?;

        let config = ClientConfig {
            tenant_url,
            credentials: Credentials::new(client_id, client_secret),
            session_name: self.session_name,
            timeout: self.timeout,
            accept_invalid_certs: self.accept_invalid_certs,
            token: self.token,
        };
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfigBuilder")
            .field("tenant_url", &self.tenant_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .field("session_name", &self.session_name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// First non-blank value among `names`, in order, handed to `wrap` as soon
/// as it is read. Skipped values are zeroed on drop.
fn lookup_env<T>(
    env: &dyn Fn(&str) -> Option<String>,
    names: &[&str],
    wrap: impl Fn(String) -> T,
) -> Option<T> {
    let preferred = names.first().copied().unwrap_or_default();
    names.iter().find_map(|&name| {
        let mut value = Zeroizing::new(env(name)?);
        if value.trim().is_empty() {
            return None;
        }
        if name != preferred {
            tracing::warn!(
                variable = name,
                preferred,
                "deprecated environment variable in use, rename it"
            );
        }
        Some(wrap(mem::take(&mut *value)))
    })
}

fn missing(what: &str, names: &[&str]) -> Error {
    let preferred = names.first().copied().unwrap_or_default();
    Error::Config(format!("{what} not provided and {preferred} is not set"))
}
