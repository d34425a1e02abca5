use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use time::OffsetDateTime;
use usercloud_http::{AsyncTransport, BlockingTransport, RawResponse};

use crate::config::TokenConfig;
use crate::credentials::Credentials;
use crate::error::TokenError;
use crate::exchange::{parse_token_response, token_request};
use crate::token::AccessToken;

/// State shared by both managers: the cached token and what is needed to
/// replace it.
struct TokenCache {
    credentials: Credentials,
    config: TokenConfig,
    current: ArcSwapOption<AccessToken>,
    exchanges: AtomicU64,
}

impl TokenCache {
    fn new(credentials: Credentials, config: TokenConfig) -> Result<Self, TokenError> {
        credentials.validate()?;
        config.validate()?;
        Ok(Self {
            credentials,
            config,
            current: ArcSwapOption::empty(),
            exchanges: AtomicU64::new(0),
        })
    }

    /// The cached token if it is not within the refresh margin of expiry.
    /// See [`AccessToken::is_expiring`] for short-lived tokens.
    fn fresh(&self) -> Option<Arc<AccessToken>> {
        let now = OffsetDateTime::now_utc();
        self.current
            .load_full()
            .filter(|token| !token.is_expiring(self.config.refresh_margin, now))
    }

    fn begin_exchange(&self) -> Result<usercloud_http::RequestDescriptor, TokenError> {
        let request = token_request(&self.credentials, &self.config)?;
        self.exchanges.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            client_id = %self.credentials.client_id(),
            path = %self.config.token_path,
            "requesting access token"
        );
        Ok(request)
    }

    fn finish_exchange(
        &self,
        response: Result<RawResponse, usercloud_http::TransportError>,
    ) -> Result<Arc<AccessToken>, TokenError> {
        let result = response
            .map_err(TokenError::from)
            .and_then(|response| {
                parse_token_response(&response, &self.config, OffsetDateTime::now_utc())
            });

        match result {
            Ok(token) => {
                let token = Arc::new(token);
                self.current.store(Some(Arc::clone(&token)));
                tracing::debug!(expires_at = %token.expires_at(), "access token refreshed");
                Ok(token)
            }
            Err(e) => {
                tracing::warn!(
                    client_id = %self.credentials.client_id(),
                    status = e.status(),
                    error = %e,
                    "access token exchange failed"
                );
                Err(e)
            }
        }
    }

    fn invalidate(&self) {
        self.current.store(None);
    }

    fn exchange_count(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }
}

/// Lazily acquires and caches the access token for async callers.
///
/// Reads of a fresh token are lock-free. When the token is missing or about
/// to expire, the first caller performs the exchange while the others wait on
/// the refresh lock and then reuse the token it stored, so concurrent callers
/// trigger a single exchange.
pub struct AsyncTokenManager {
    cache: TokenCache,
    refresh: tokio::sync::Mutex<()>,
    transport: Arc<dyn AsyncTransport>,
}

impl AsyncTokenManager {
    /// # Errors
    /// Returns [`TokenError::Config`] for blank credentials or invalid settings.
    pub fn new(
        transport: Arc<dyn AsyncTransport>,
        credentials: Credentials,
        config: TokenConfig,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            cache: TokenCache::new(credentials, config)?,
            refresh: tokio::sync::Mutex::new(()),
            transport,
        })
    }

    /// Return a token that is valid for at least the refresh margin, or half
    /// its lifetime when that is shorter.
    ///
    /// # Errors
    /// Returns [`TokenError`] when a required exchange fails. The failure is
    /// not cached; the next call tries again.
    pub async fn get_valid_token(&self) -> Result<Arc<AccessToken>, TokenError> {
        if let Some(token) = self.cache.fresh() {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;
        if let Some(token) = self.cache.fresh() {
            return Ok(token);
        }

        let request = self.cache.begin_exchange()?;
        let response = self.transport.execute(request).await;
        self.cache.finish_exchange(response)
    }

    /// Drop the cached token so the next call performs a fresh exchange.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Number of token exchanges attempted so far.
    #[must_use]
    pub fn exchange_count(&self) -> u64 {
        self.cache.exchange_count()
    }
}

impl fmt::Debug for AsyncTokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTokenManager")
            .field("client_id", &self.cache.credentials.client_id())
            .field("exchanges", &self.exchange_count())
            .finish_non_exhaustive()
    }
}

/// Blocking counterpart of [`AsyncTokenManager`]; refreshes under a mutex.
pub struct BlockingTokenManager {
    cache: TokenCache,
    refresh: parking_lot::Mutex<()>,
    transport: Arc<dyn BlockingTransport>,
}

impl BlockingTokenManager {
    /// # Errors
    /// Returns [`TokenError::Config`] for blank credentials or invalid settings.
    pub fn new(
        transport: Arc<dyn BlockingTransport>,
        credentials: Credentials,
        config: TokenConfig,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            cache: TokenCache::new(credentials, config)?,
            refresh: parking_lot::Mutex::new(()),
            transport,
        })
    }

    /// See [`AsyncTokenManager::get_valid_token`].
    ///
    /// # Errors
    /// Returns [`TokenError`] when a required exchange fails.
    pub fn get_valid_token(&self) -> Result<Arc<AccessToken>, TokenError> {
        if let Some(token) = self.cache.fresh() {
            return Ok(token);
        }

        let _refresh = self.refresh.lock();
        if let Some(token) = self.cache.fresh() {
            return Ok(token);
        }

        let request = self.cache.begin_exchange()?;
        let response = self.transport.execute(request);
        self.cache.finish_exchange(response)
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    #[must_use]
    pub fn exchange_count(&self) -> u64 {
        self.cache.exchange_count()
    }
}

impl fmt::Debug for BlockingTokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingTokenManager")
            .field("client_id", &self.cache.credentials.client_id())
            .field("exchanges", &self.exchange_count())
            .finish_non_exhaustive()
    }
}
