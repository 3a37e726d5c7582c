use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use hyper::header::HeaderValue;

use crate::error::DavError;

/// Build the `Authorization: Basic ...` value for `username:password`.
///
/// Computed fresh for every operation; nothing is cached between calls.
pub fn basic_auth_header(username: &str, password: &str) -> Result<HeaderValue, DavError> {
    if username.is_empty() {
        return Err(DavError::InvalidCredentials("username is empty"));
    }
    if password.is_empty() {
        return Err(DavError::InvalidCredentials("password is empty"));
    }

    let token = format!("{username}:{password}");
    let mut value = HeaderValue::from_str(&format!("Basic {}", B64.encode(token)))
        .map_err(|_| DavError::InvalidCredentials("credentials are not a valid header value"))?;
    value.set_sensitive(true);
    Ok(value)
}
