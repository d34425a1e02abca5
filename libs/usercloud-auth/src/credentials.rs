use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::TokenError;
use crate::secret::SecretString;

/// Client id and secret issued by the tenant for the client-credentials grant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<SecretString>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    /// # Errors
    /// Returns [`TokenError::Config`] when the id or the secret is blank.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.client_id.trim().is_empty() {
            return Err(TokenError::Config("client_id must not be empty".into()));
        }
        if self.client_secret.is_blank() {
            return Err(TokenError::Config("client_secret must not be empty".into()));
        }
        Ok(())
    }

    /// `Authorization` header value for the token endpoint.
    ///
    /// Id and secret are percent-encoded before being joined, so a `:` inside
    /// the id cannot shift the split point on the server.
    #[must_use]
    pub fn basic_authorization(&self) -> Zeroizing<String> {
        let joined = Zeroizing::new(format!(
            "{}:{}",
            urlencoding::encode(&self.client_id),
            urlencoding::encode(self.client_secret.expose())
        ));
        let encoded = Zeroizing::new(general_purpose::STANDARD.encode(joined.as_bytes()));
        Zeroizing::new(format!("Basic {}", encoded.as_str()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn basic_authorization_encodes_both_parts() {
        let credentials = Credentials::new("client", "secret");
        // base64("client:secret")
        assert_eq!(
            credentials.basic_authorization().as_str(),
            "Basic Y2xpZW50OnNlY3JldA=="
        );
    }

    #[test]
    fn basic_authorization_percent_encodes_reserved_characters() {
        let credentials = Credentials::new("a:b", "p@ss word");
        let header = credentials.basic_authorization();
        let encoded = header.strip_prefix("Basic ").unwrap();
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, b"a%3Ab:p%40ss%20word");
    }

    #[test]
    fn validate_rejects_blank_values() {
        assert!(matches!(
            Credentials::new("  ", "x").validate(),
            Err(TokenError::Config(msg)) if msg.contains("client_id")
        ));
        assert!(matches!(
            Credentials::new("id", "").validate(),
            Err(TokenError::Config(msg)) if msg.contains("client_secret")
        ));
        assert!(Credentials::new("id", "secret").validate().is_ok());
    }

    #[test]
    fn debug_hides_secret() {
        let credentials = Credentials::new("id", "very-secret");
        let printed = format!("{credentials:?}");
        assert!(printed.contains("id"));
        assert!(!printed.contains("very-secret"));
    }
}
