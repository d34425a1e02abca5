use std::fmt;
use std::time::Duration;

use time::OffsetDateTime;
use zeroize::Zeroizing;

use crate::secret::SecretString;

/// A bearer token together with the instant it stops being accepted.
///
/// Opaque outside this crate: callers only get the `Authorization` header
/// value and the expiry.
#[derive(Clone)]
pub struct AccessToken {
    value: SecretString,
    issued_at: OffsetDateTime,
    expires_at: OffsetDateTime,
}

impl AccessToken {
    pub(crate) fn new(
        value: impl Into<SecretString>,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            value: value.into(),
            issued_at,
            expires_at,
        }
    }

    #[cfg(test)]
    pub(crate) fn secret(&self) -> &SecretString {
        &self.value
    }

    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    /// Whether the token expires within `margin` of `now`.
    ///
    /// The margin is capped at half the token's lifetime, so a token issued
    /// with a lifetime shorter than the margin is still used before it is
    /// replaced.
    pub(crate) fn is_expiring(&self, margin: Duration, now: OffsetDateTime) -> bool {
        let lifetime = self.expires_at - self.issued_at;
        let margin = time::Duration::try_from(margin)
            .unwrap_or(time::Duration::MAX)
            .min(lifetime / 2)
            .max(time::Duration::ZERO);
        now.checked_add(margin)
            .is_none_or(|deadline| deadline >= self.expires_at)
    }

    /// `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("Bearer {}", self.value.expose()))
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &self.value)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
