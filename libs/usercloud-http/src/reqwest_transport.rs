use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::request::{HeaderMap, Method, RequestDescriptor};
use crate::response::RawResponse;
use crate::transport::{AsyncTransport, BlockingTransport};

/// [`AsyncTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// # Errors
    /// Returns [`TransportError::Build`] if the TLS backend cannot be initialized.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Wrap an existing client, e.g. one configured with a proxy.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &TransportConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl AsyncTransport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let url = request.url(&self.base_url)?;
        let start = Instant::now();

        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e, self.timeout))?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| map_body_error(&e, self.timeout))?;

        debug!(
            status,
            elapsed_ms = elapsed_ms(start),
            body_size = body.len(),
            "HTTP request completed"
        );

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// [`BlockingTransport`] backed by `reqwest::blocking::Client`.
///
/// Must not be constructed or used from within an async runtime thread,
/// reqwest panics when its blocking client runs on one.
#[derive(Debug, Clone)]
pub struct BlockingReqwestTransport {
    client: reqwest::blocking::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl BlockingReqwestTransport {
    /// # Errors
    /// Returns [`TransportError::Build`] if the TLS backend cannot be initialized.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl BlockingTransport for BlockingReqwestTransport {
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let url = request.url(&self.base_url)?;
        let start = Instant::now();

        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body.to_vec());
        }

        let response = builder
            .send()
            .map_err(|e| map_reqwest_error(&e, self.timeout))?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .map_err(|e| map_body_error(&e, self.timeout))?;

        debug!(
            status,
            elapsed_ms = elapsed_ms(start),
            body_size = body.len(),
            "HTTP request completed"
        );

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

// Non-UTF-8 header values are dropped; nothing the SDK reads can contain them.
fn collect_headers(headers: &reqwest::header::HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_owned(), v.to_owned()))
        })
        .collect()
}

fn map_reqwest_error(err: &reqwest::Error, timeout: Option<Duration>) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout.unwrap_or_default())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_builder() {
        TransportError::InvalidUrl {
            url: err.url().map(ToString::to_string).unwrap_or_default(),
            reason: err.to_string(),
        }
    } else {
        TransportError::Other(Box::new(std::io::Error::other(err.to_string())))
    }
}

fn map_body_error(err: &reqwest::Error, timeout: Option<Duration>) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout.unwrap_or_default())
    } else {
        TransportError::Body(err.to_string())
    }
}

// Elapsed time in ms always fits in u64 in practice
#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
