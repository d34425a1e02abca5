use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::error::TransportError;

pub const CONTENT_TYPE: &str = "content-type";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Header map keyed by lower-cased header name.
pub type HeaderMap = BTreeMap<String, String>;

/// HTTP verbs used by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a transport needs to perform one HTTP exchange.
///
/// `path` is relative to the tenant base URL. Header names are stored
/// lower-cased so lookups are case-insensitive.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl RequestDescriptor {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter. Repeated names are kept in order.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter only when `value` is present.
    #[must_use]
    pub fn query_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Insert or replace a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Serialize `body` as JSON and set the matching content type.
    ///
    /// # Errors
    /// Returns [`TransportError::Encode`] if serialization fails.
    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, TransportError> {
        let bytes = serde_json::to_vec(body).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.body = Some(Bytes::from(bytes));
        Ok(self.header(CONTENT_TYPE, JSON_CONTENT_TYPE))
    }

    /// Serialize `form` as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    /// Returns [`TransportError::Encode`] if serialization fails.
    pub fn form_body<T: Serialize + ?Sized>(mut self, form: &T) -> Result<Self, TransportError> {
        let encoded =
            serde_urlencoded::to_string(form).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.body = Some(Bytes::from(encoded));
        Ok(self.header(CONTENT_TYPE, FORM_CONTENT_TYPE))
    }

    /// Resolve the full request URL against the tenant base URL.
    ///
    /// The path is appended to the base path, so a base of
    /// `https://acme.example.com/prefix` and a path of `/authn/users` yields
    /// `https://acme.example.com/prefix/authn/users`.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidUrl`] if the joined URL does not parse.
    pub fn url(&self, base: &Url) -> Result<Url, TransportError> {
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined).map_err(|e| TransportError::InvalidUrl {
            url: joined.clone(),
            reason: e.to_string(),
        })?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str())),
            );
        }
        Ok(url)
    }
}

// Header values may carry bearer tokens; only names are printed.
impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("https://acme.tenant.userclouds.com").unwrap()
    }

    #[test]
    fn url_joins_path_and_query() {
        let request = RequestDescriptor::get("/authn/users")
            .query("version", "3")
            .query("starting_after", "id:abc");
        let url = request.url(&base()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://acme.tenant.userclouds.com/authn/users?version=3&starting_after=id%3Aabc"
        );
    }

    #[test]
    fn url_keeps_base_prefix() {
        let base = Url::parse("http://127.0.0.1:8080/prefix/").unwrap();
        let url = RequestDescriptor::get("authz/objects/1").url(&base).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/prefix/authz/objects/1");
    }

    #[test]
    fn query_opt_skips_missing_values() {
        let request = RequestDescriptor::get("/x")
            .query_opt("limit", Some("10"))
            .query_opt("organization_id", None::<String>);
        assert_eq!(request.query, vec![("limit".to_owned(), "10".to_owned())]);
    }

    #[test]
    fn headers_are_case_insensitive() {
        let mut request = RequestDescriptor::post("/x").header("Authorization", "Bearer a");
        request.set_header("AUTHORIZATION", "Bearer b");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header_value("authorization"), Some("Bearer b"));
    }

    #[test]
    fn json_body_sets_content_type() {
        let request = RequestDescriptor::put("/x")
            .json_body(&json!({"profile": {"email": "a@b.c"}}))
            .unwrap();
        assert_eq!(request.header_value("Content-Type"), Some(JSON_CONTENT_TYPE));
        let body: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(body["profile"]["email"], "a@b.c");
    }

    #[test]
    fn form_body_is_urlencoded() {
        let request = RequestDescriptor::post("/oidc/token")
            .form_body(&[("grant_type", "client_credentials"), ("scope", "a b")])
            .unwrap();
        assert_eq!(request.header_value(CONTENT_TYPE), Some(FORM_CONTENT_TYPE));
        assert_eq!(
            request.body.as_deref(),
            Some(&b"grant_type=client_credentials&scope=a+b"[..])
        );
    }

    #[test]
    fn debug_hides_header_values() {
        let request = RequestDescriptor::get("/x").header("authorization", "Bearer secret-token");
        let printed = format!("{request:?}");
        assert!(printed.contains("authorization"));
        assert!(!printed.contains("secret-token"));
    }
}
