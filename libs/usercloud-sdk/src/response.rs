//! Response mapper: classify a [`RawResponse`] by status and decode its body.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use usercloud_http::RawResponse;
use uuid::Uuid;

use crate::error::Error;

/// Decode a 2xx JSON body; fields the model does not know are skipped.
///
/// # Errors
/// [`Error::Http`] for a non-2xx status, [`Error::Decode`] for a body of the
/// wrong shape.
pub fn decode_json<T: DeserializeOwned>(response: &RawResponse) -> Result<T, Error> {
    if !response.is_success() {
        return Err(http_error(response));
    }
    serde_json::from_slice(&response.body).map_err(|e| Error::Decode(e.to_string()))
}

/// Deletes are idempotent: a 404 means the resource is already gone.
///
/// Returns `true` when the server deleted something, `false` on 404.
///
/// # Errors
/// [`Error::Http`] for any other non-2xx status.
pub fn decode_delete(response: &RawResponse) -> Result<bool, Error> {
    match response.status {
        404 => Ok(false),
        _ if response.is_success() => Ok(true),
        _ => Err(http_error(response)),
    }
}

/// # Errors
/// [`Error::Http`] for a non-2xx status.
pub fn decode_text(response: &RawResponse) -> Result<String, Error> {
    if !response.is_success() {
        return Err(http_error(response));
    }
    Ok(response.text().into_owned())
}

#[must_use]
pub fn http_error(response: &RawResponse) -> Error {
    let details = response.error_details();
    Error::Http {
        status: response.status,
        message: details.message,
        request_id: details.request_id,
        body: details.body,
    }
}

#[derive(Deserialize)]
struct ConflictBody {
    id: Uuid,
    #[serde(default)]
    identical: bool,
}

/// Id of the existing resource when a create failed only because an
/// identical resource is already there.
#[must_use]
pub fn identical_conflict_id(error: &Error) -> Option<Uuid> {
    let Error::Http {
        status: 409,
        body: Some(body),
        ..
    } = error
    else {
        return None;
    };
    let conflict = ConflictBody::deserialize(body).ok()?;
    conflict.identical.then_some(conflict.id)
}
