//! Transports are used behind trait objects by the SDK; these tests exercise
//! both the reqwest implementations and a hand-written one through `dyn`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use httpmock::prelude::*;
use url::Url;
use usercloud_http::{
    AsyncTransport, BlockingReqwestTransport, BlockingTransport, RawResponse, RequestDescriptor,
    ReqwestTransport, TransportConfig, TransportError,
};

#[derive(Default)]
struct Recording {
    seen: Mutex<Vec<RequestDescriptor>>,
}

#[async_trait]
impl AsyncTransport for Recording {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        Ok(RawResponse::new(204))
    }
}

#[tokio::test]
async fn custom_transport_behind_dyn() {
    let recording = Arc::new(Recording::default());
    let transport: Arc<dyn AsyncTransport> = recording.clone();

    let response = transport
        .execute(RequestDescriptor::delete("/authz/edges/1"))
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    let seen = recording.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/authz/edges/1");
}

#[tokio::test]
async fn reqwest_transport_behind_dyn() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT).path("/authn/users/42");
            then.status(200)
                .header("content-type", "application/json; charset=utf-8")
                .body(r#"{"id":"42"}"#);
        })
        .await;

    let config = TransportConfig::new(Url::parse(&server.base_url()).unwrap());
    let transport: Arc<dyn AsyncTransport> = Arc::new(ReqwestTransport::new(&config).unwrap());
    let response = transport
        .execute(RequestDescriptor::put("/authn/users/42"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(response.is_json());
    assert_eq!(response.text(), r#"{"id":"42"}"#);
}

#[test]
fn blocking_transport_behind_dyn() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/authz/checkattribute");
        then.status(500).header("x-request-id", "r-9").body("boom");
    });

    let config = TransportConfig::new(Url::parse(&server.base_url()).unwrap());
    let transport: Box<dyn BlockingTransport> =
        Box::new(BlockingReqwestTransport::new(&config).unwrap());
    let response = transport
        .execute(RequestDescriptor::get("/authz/checkattribute"))
        .unwrap();

    mock.assert();
    assert_eq!(response.status, 500);
    assert_eq!(response.header("x-request-id"), Some("r-9"));
}
