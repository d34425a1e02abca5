use std::fmt;
use std::path::Path;
use std::sync::Arc;

use usercloud_auth::AsyncTokenManager;
use usercloud_http::{AsyncTransport, ReqwestTransport};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::headers::SdkHeaders;
use crate::models;
use crate::operations::{IntoOperation, Operation, authz, retention, tokenizer, users, userstore};

/// Async client for one tenant.
///
/// Cloning is cheap; clones share the connection pool and the cached access
/// token. Every method validates its arguments, attaches a valid token and
/// decodes the response into the returned type.
///
/// ```ignore
/// let client = Client::from_env()?;
/// let user = client.get_user(user_id).await?;
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    headers: SdkHeaders,
    tokens: AsyncTokenManager,
    transport: Arc<dyn AsyncTransport>,
}

impl Client {
    /// Connect over HTTPS with `reqwest`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for invalid settings and [`Error::Transport`]
    /// when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.transport_config())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// [`Client::new`] with the configuration read from the environment.
    ///
    /// # Errors
    /// See [`ClientConfig::from_env`] and [`Client::new`].
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Use a caller-supplied transport, for example one that retries or a
    /// stub in tests. The token exchange goes through the same transport.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for invalid settings.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn AsyncTransport>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let tokens = AsyncTokenManager::new(
            Arc::clone(&transport),
            config.credentials.clone(),
            config.token_config(),
        )
        .map_err(|e| Error::Config(e.to_string()))?;
        tracing::debug!(tenant = %config.tenant_url, "client created");
        Ok(Self {
            inner: Arc::new(Inner {
                headers: config.sdk_headers(),
                config,
                tokens,
                transport,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Number of token exchanges performed so far.
    #[must_use]
    pub fn token_exchange_count(&self) -> u64 {
        self.inner.tokens.exchange_count()
    }

    /// Download the generated userstore SDK and write it to `path`,
    /// replacing any existing file.
    ///
    /// # Errors
    /// Any error of [`Client::download_userstore_sdk`], or [`Error::Io`] when
    /// the file cannot be written.
    pub async fn save_userstore_sdk(
        &self,
        path: &Path,
        include_example: bool,
    ) -> Result<(), Error> {
        let source = self.download_userstore_sdk(include_example).await?;
        tokio::fs::write(path, source)
            .await
            .map_err(|e| Error::io(path, e))?;
        tracing::debug!(path = %path.display(), "userstore SDK saved");
        Ok(())
    }

    async fn execute<T: 'static>(&self, operation: Operation<T>) -> Result<T, Error> {
        let (mut request, decode) = operation.into_parts();
        let token = self.inner.tokens.get_valid_token().await?;
        self.inner.headers.apply(&mut request, &token.bearer());

        let method = request.method;
        let path = request.path.clone();
        let response = self.inner.transport.execute(request).await?;
        tracing::debug!(%method, path = %path, status = response.status, "request completed");
        if response.status == 401 {
            tracing::debug!(path = %path, "token rejected, dropping cached token");
            self.inner.tokens.invalidate();
        }
        decode(&response)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("headers", &self.inner.headers)
            .field("tokens", &self.inner.tokens)
            .finish_non_exhaustive()
    }
}

macro_rules! async_methods {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $out:ty = $op:path;
    )*) => {
        impl Client {
            $(
                $(#[$meta])*
                ///
                /// # Errors
                /// [`Error::Validation`] for bad arguments, before any request
                /// is sent; otherwise any other [`Error`] kind.
                pub async fn $name(&self, $($arg: $ty),*) -> Result<$out, Error> {
                    let operation = IntoOperation::into_operation($op($($arg),*))?;
                    self.execute(operation).await
                }
            )*
        }
    };
}

client_operations!(async_methods);
