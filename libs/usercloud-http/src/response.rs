use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use serde_json::Value;

use crate::request::{CONTENT_TYPE, HeaderMap, JSON_CONTENT_TYPE};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// What a failed response says about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    /// The `error` field of a JSON body, or `HTTP <status> - <body>`
    pub message: String,
    /// `request_id` from the body, else the `x-request-id` header
    pub request_id: Option<String>,
    /// The parsed body when the server sent JSON
    pub body: Option<Value>,
}

/// A response as returned by the server, before any classification.
#[derive(Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body along with its content type.
    #[must_use]
    pub fn with_json(self, value: &serde_json::Value) -> Self {
        self.with_header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .with_body(value.to_string())
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether the content type is `application/json`, ignoring parameters.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.header(CONTENT_TYPE).is_some_and(|value| {
            value
                .split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
        })
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Extract the server's error message and request id.
    ///
    /// A JSON `error` field that is not a string is rendered as compact JSON.
    #[must_use]
    pub fn error_details(&self) -> ErrorDetails {
        let header_request_id = self.header(REQUEST_ID_HEADER).map(str::to_owned);
        let body = if self.is_json() {
            serde_json::from_slice::<Value>(&self.body).ok()
        } else {
            None
        };

        let message = match body.as_ref().and_then(|b| b.get("error")) {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => format!("HTTP {} - {}", self.status, self.text()),
        };
        let request_id = body
            .as_ref()
            .and_then(|b| b.get("request_id"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .or(header_request_id);

        ErrorDetails {
            message,
            request_id,
            body,
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body_len", &self.body.len())
            .finish()
    }
}
