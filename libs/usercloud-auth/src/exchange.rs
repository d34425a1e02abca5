//! Client-credentials grant: building the token request and reading the
//! token endpoint's answer.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use time::OffsetDateTime;
use usercloud_http::{RawResponse, RequestDescriptor};

use crate::config::TokenConfig;
use crate::credentials::Credentials;
use crate::error::TokenError;
use crate::token::AccessToken;

/// Token endpoint response. Unknown fields are ignored.
///
/// Deserialize-only so the access token cannot be serialized by accident.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Build the `POST` to the token endpoint.
///
/// # Errors
/// Returns [`TokenError::Transport`] if the form body cannot be encoded.
pub fn token_request(
    credentials: &Credentials,
    config: &TokenConfig,
) -> Result<RequestDescriptor, TokenError> {
    let mut request = RequestDescriptor::post(config.token_path.as_str())
        .form_body(&[("grant_type", "client_credentials")])?;
    for (name, value) in &config.extra_headers {
        request.set_header(name, value.as_str());
    }
    request.set_header("authorization", credentials.basic_authorization().as_str());
    Ok(request)
}

/// Turn the token endpoint's response into an [`AccessToken`].
///
/// Expiry comes from `expires_in` when present, else from the `exp` claim of
/// the token read as an unverified JWT, else `now + fallback_ttl`.
///
/// # Errors
/// - [`TokenError::Rejected`] for a non-2xx status
/// - [`TokenError::InvalidResponse`] for a body without a usable `access_token`
/// - [`TokenError::UnsupportedTokenType`] when `token_type` is not `Bearer`
pub fn parse_token_response(
    response: &RawResponse,
    config: &TokenConfig,
    now: OffsetDateTime,
) -> Result<AccessToken, TokenError> {
    if !response.is_success() {
        let details = response.error_details();
        return Err(TokenError::Rejected {
            status: response.status,
            error: details.message,
            request_id: details.request_id,
        });
    }

    let body: TokenResponse = serde_json::from_slice(&response.body)
        .map_err(|e| TokenError::InvalidResponse(e.to_string()))?;

    if body.access_token.trim().is_empty() {
        return Err(TokenError::InvalidResponse("empty access_token".into()));
    }
    if let Some(ref token_type) = body.token_type
        && !token_type.eq_ignore_ascii_case("bearer")
    {
        return Err(TokenError::UnsupportedTokenType(token_type.clone()));
    }

    let expires_at = match body.expires_in {
        Some(secs) => add(now, Duration::from_secs(secs))
            .ok_or_else(|| TokenError::InvalidResponse("expires_in out of range".into()))?,
        None => match jwt_expiry(&body.access_token) {
            Some(exp) => exp,
            None => add(now, config.fallback_ttl)
                .ok_or_else(|| TokenError::Config("fallback_ttl out of range".into()))?,
        },
    };

    Ok(AccessToken::new(body.access_token, now, expires_at))
}

fn add(now: OffsetDateTime, lifetime: Duration) -> Option<OffsetDateTime> {
    time::Duration::try_from(lifetime)
        .ok()
        .and_then(|lifetime| now.checked_add(lifetime))
}

/// Read the `exp` claim without verifying the signature.
///
/// The tenant issues JWTs, but the SDK only uses the claim to schedule a
/// refresh; the server remains the authority on validity.
fn jwt_expiry(token: &str) -> Option<OffsetDateTime> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let decoded = general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    OffsetDateTime::from_unix_timestamp(exp).ok()
}
