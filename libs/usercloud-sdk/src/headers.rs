use usercloud_http::RequestDescriptor;

pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USER_AGENT_HEADER: &str = "user-agent";
pub const SDK_VERSION_HEADER: &str = "x-usercloudssdk-version";
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Identification headers sent with every request, token exchange included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkHeaders {
    user_agent: String,
}

impl SdkHeaders {
    /// A non-blank session name is appended to the user agent in brackets.
    #[must_use]
    pub fn new(session_name: Option<&str>) -> Self {
        let base = format!("UserClouds Rust SDK v{SDK_VERSION}");
        let user_agent = match session_name.map(str::trim) {
            Some(session) if !session.is_empty() => format!("{base} [{session}]"),
            _ => base,
        };
        Self { user_agent }
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Header pairs for the token request.
    #[must_use]
    pub fn identification(&self) -> Vec<(String, String)> {
        vec![
            (USER_AGENT_HEADER.to_owned(), self.user_agent.clone()),
            (SDK_VERSION_HEADER.to_owned(), SDK_VERSION.to_owned()),
        ]
    }

    /// Stamp identification headers and the `Bearer …` authorization value
    /// onto an API request.
    pub fn apply(&self, request: &mut RequestDescriptor, bearer: &str) {
        request.set_header(USER_AGENT_HEADER, self.user_agent.as_str());
        request.set_header(SDK_VERSION_HEADER, SDK_VERSION);
        request.set_header(AUTHORIZATION_HEADER, bearer);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn user_agent_without_session() {
        let headers = SdkHeaders::new(None);
        assert_eq!(
            headers.user_agent(),
            format!("UserClouds Rust SDK v{SDK_VERSION}")
        );
        assert_eq!(SdkHeaders::new(Some("  ")), headers);
    }

    #[test]
    fn user_agent_with_session() {
        let headers = SdkHeaders::new(Some("nightly-sync"));
        assert!(headers.user_agent().ends_with(" [nightly-sync]"));
    }

    #[test]
    fn apply_sets_all_headers() {
        let headers = SdkHeaders::new(Some("s"));
        let mut request = RequestDescriptor::get("/authn/users");
        headers.apply(&mut request, "Bearer tok");

        assert_eq!(request.header_value("Authorization"), Some("Bearer tok"));
        assert_eq!(request.header_value(SDK_VERSION_HEADER), Some(SDK_VERSION));
        assert_eq!(
            request.header_value(USER_AGENT_HEADER),
            Some(headers.user_agent())
        );
        assert_eq!(request.header_value("content-type"), None);
    }

    #[test]
    fn identification_pairs() {
        let pairs = SdkHeaders::new(None).identification();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().any(|(k, v)| k == SDK_VERSION_HEADER && v == SDK_VERSION));
    }
}
