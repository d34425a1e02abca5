use std::time::Duration;

use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 32;

/// Settings for the reqwest-backed transports.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Tenant base URL every request path is resolved against
    pub base_url: Url,
    /// Total request timeout, `None` disables it
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Skip TLS certificate verification (local development only)
    pub accept_invalid_certs: bool,
    pub pool_max_idle_per_host: usize,
}

impl TransportConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Some(DEFAULT_TIMEOUT),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            accept_invalid_certs: false,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TransportConfig::new(Url::parse("https://acme.example.com").unwrap());
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn builders_override() {
        let config = TransportConfig::new(Url::parse("https://acme.example.com").unwrap())
            .with_timeout(None)
            .with_connect_timeout(Some(Duration::from_secs(1)))
            .danger_accept_invalid_certs(true);
        assert_eq!(config.timeout, None);
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(1)));
        assert!(config.accept_invalid_certs);
    }
}
