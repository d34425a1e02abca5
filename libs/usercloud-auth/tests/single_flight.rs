//! Concurrency behaviour of the token managers against a slow token endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use usercloud_auth::{AsyncTokenManager, BlockingTokenManager, Credentials, TokenConfig, TokenError};
use usercloud_http::{
    AsyncTransport, BlockingTransport, RawResponse, RequestDescriptor, TransportError,
};

/// Token endpoint stub that takes a while to answer and counts exchanges.
struct SlowTokenEndpoint {
    exchanges: AtomicUsize,
    delay: Duration,
    status: u16,
    expires_in: u64,
}

impl SlowTokenEndpoint {
    fn new(status: u16) -> Arc<Self> {
        Arc::new(Self {
            exchanges: AtomicUsize::new(0),
            delay: Duration::from_millis(50),
            status,
            expires_in: 3600,
        })
    }

    fn expiring_in(secs: u64) -> Arc<Self> {
        Arc::new(Self {
            exchanges: AtomicUsize::new(0),
            delay: Duration::from_millis(50),
            status: 200,
            expires_in: secs,
        })
    }

    fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    fn answer(&self, request: &RequestDescriptor) -> RawResponse {
        assert_eq!(request.path, "/oidc/token");
        let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        if self.status == 200 {
            RawResponse::new(200).with_json(&json!({
                "access_token": format!("tok-{n}"),
                "expires_in": self.expires_in,
                "token_type": "Bearer",
            }))
        } else {
            RawResponse::new(self.status)
                .with_header("x-request-id", "req-42")
                .with_json(&json!({"error": "invalid_client"}))
        }
    }
}

#[async_trait]
impl AsyncTransport for SlowTokenEndpoint {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.answer(&request))
    }
}

impl BlockingTransport for SlowTokenEndpoint {
    fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        thread::sleep(self.delay);
        Ok(self.answer(&request))
    }
}

fn credentials() -> Credentials {
    Credentials::new("jerry", "cosmo")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_async_callers_share_one_exchange() {
    let endpoint = SlowTokenEndpoint::new(200);
    let manager = Arc::new(
        AsyncTokenManager::new(endpoint.clone(), credentials(), TokenConfig::default()).unwrap(),
    );

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_valid_token().await })
        })
        .collect();

    for task in tasks {
        let token = task.await.unwrap().unwrap();
        assert_eq!(token.bearer().as_str(), "Bearer tok-1");
    }
    assert_eq!(endpoint.exchanges(), 1);
    assert_eq!(manager.exchange_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lifetime_below_refresh_margin_still_shares_one_exchange() {
    // 2s lifetime against the default 5s margin
    let endpoint = SlowTokenEndpoint::expiring_in(2);
    let manager = Arc::new(
        AsyncTokenManager::new(endpoint.clone(), credentials(), TokenConfig::default()).unwrap(),
    );

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_valid_token().await })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap().bearer().as_str(), "Bearer tok-1");
    }

    manager.get_valid_token().await.unwrap();
    assert_eq!(endpoint.exchanges(), 1);
}

#[tokio::test]
async fn two_joined_calls_trigger_one_exchange() {
    let endpoint = SlowTokenEndpoint::new(200);
    let manager =
        AsyncTokenManager::new(endpoint.clone(), credentials(), TokenConfig::default()).unwrap();

    let (a, b) = tokio::join!(manager.get_valid_token(), manager.get_valid_token());
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(endpoint.exchanges(), 1);
}

#[test]
fn concurrent_blocking_callers_share_one_exchange() {
    let endpoint = SlowTokenEndpoint::new(200);
    let manager = Arc::new(
        BlockingTokenManager::new(endpoint.clone(), credentials(), TokenConfig::default())
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.get_valid_token())
        })
        .collect();

    for handle in handles {
        let token = handle.join().unwrap().unwrap();
        assert_eq!(token.bearer().as_str(), "Bearer tok-1");
    }
    assert_eq!(endpoint.exchanges(), 1);
}

#[tokio::test]
async fn rejected_exchange_is_not_cached() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let endpoint = SlowTokenEndpoint::new(401);
    let manager =
        AsyncTokenManager::new(endpoint.clone(), credentials(), TokenConfig::default()).unwrap();

    for attempt in 1..=2 {
        let err = manager.get_valid_token().await.unwrap_err();
        match err {
            TokenError::Rejected {
                status,
                error,
                request_id,
            } => {
                assert_eq!(status, 401);
                assert_eq!(error, "invalid_client");
                assert_eq!(request_id.as_deref(), Some("req-42"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(endpoint.exchanges(), attempt);
    }
}
