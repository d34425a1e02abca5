use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use usercloud_auth::BlockingTokenManager;
use usercloud_http::{BlockingReqwestTransport, BlockingTransport};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::headers::SdkHeaders;
use crate::models;
use crate::operations::{IntoOperation, Operation, authz, retention, tokenizer, users, userstore};

/// Blocking client for one tenant, with the same methods as
/// [`Client`](crate::Client).
///
/// Each call blocks the calling thread for the whole round trip. Do not create
/// or use it from inside an async runtime; use [`Client`](crate::Client)
/// there.
#[derive(Clone)]
pub struct BlockingClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    headers: SdkHeaders,
    tokens: BlockingTokenManager,
    transport: Arc<dyn BlockingTransport>,
}

impl BlockingClient {
    /// # Errors
    /// Returns [`Error::Config`] for invalid settings and [`Error::Transport`]
    /// when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;
        let transport = BlockingReqwestTransport::new(&config.transport_config())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// # Errors
    /// See [`ClientConfig::from_env`] and [`BlockingClient::new`].
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env()?)
    }

    /// # Errors
    /// Returns [`Error::Config`] for invalid settings.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn BlockingTransport>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let tokens = BlockingTokenManager::new(
            Arc::clone(&transport),
            config.credentials.clone(),
            config.token_config(),
        )
        .map_err(|e| Error::Config(e.to_string()))?;
        tracing::debug!(tenant = %config.tenant_url, "blocking client created");
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

    #[must_use]
    pub fn token_exchange_count(&self) -> u64 {
        self.inner.tokens.exchange_count()
    }

    /// Blocking [`Client::save_userstore_sdk`](crate::Client::save_userstore_sdk).
    ///
    /// # Errors
    /// Any error of [`BlockingClient::download_userstore_sdk`], or
    /// [`Error::Io`] when the file cannot be written.
    pub fn save_userstore_sdk(&self, path: &Path, include_example: bool) -> Result<(), Error> {
        let source = self.download_userstore_sdk(include_example)?;
        fs::write(path, source).map_err(|e| Error::io(path, e))?;
        tracing::debug!(path = %path.display(), "userstore SDK saved");
        Ok(())
    }

    fn execute<T: 'static>(&self, operation: Operation<T>) -> Result<T, Error> {
        let (mut request, decode) = operation.into_parts();
        let token = self.inner.tokens.get_valid_token()?;
        self.inner.headers.apply(&mut request, &token.bearer());

        let method = request.method;
        let path = request.path.clone();
        let response = self.inner.transport.execute(request)?;
        tracing::debug!(%method, path = %path, status = response.status, "request completed");
        if response.status == 401 {
            tracing::debug!(path = %path, "token rejected, dropping cached token");
            self.inner.tokens.invalidate();
        }
        decode(&response)
    }
}

impl fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingClient")
            .field("config", &self.inner.config)
            .field("headers", &self.inner.headers)
            .field("tokens", &self.inner.tokens)
            .finish_non_exhaustive()
    }
}

macro_rules! blocking_methods {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $out:ty = $op:path;
    )*) => {
        impl BlockingClient {
            $(
                $(#[$meta])*
                ///
                /// # Errors
                /// [`Error::Validation`] for bad arguments, before any request
                /// is sent; otherwise any other [`Error`] kind.
                pub fn $name(&self, $($arg: $ty),*) -> Result<$out, Error> {
                    let operation = IntoOperation::into_operation($op($($arg),*))?;
                    self.execute(operation)
                }
            )*
        }
    };
}

client_operations!(blocking_methods);
