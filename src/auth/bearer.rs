//! Credential extraction from `Authorization` header values.

use crate::auth::{AuthError, AuthResult};

pub const BEARER_SCHEME: &str = "Bearer";
pub const API_KEY_SCHEME: &str = "ApiKey";

/// Pull the token out of a `Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> AuthResult<&str> {
    extract_credential(header, BEARER_SCHEME)
}

/// Pull the credential out of a `<scheme> <credential>` header value.
///
/// An absent or blank header is [`AuthError::MissingCredential`]; a value
/// without a second field, or with a different scheme, is
/// [`AuthError::MalformedCredential`].
pub fn extract_credential<'h>(header: Option<&'h str>, scheme: &str) -> AuthResult<&'h str> {
    let header = header
        .filter(|value| !value.trim().is_empty())
        .ok_or(AuthError::MissingCredential)?;

    let mut fields = header.split_whitespace();
    let presented_scheme = fields.next().unwrap_or_default();
    let credential = fields.next().ok_or(AuthError::MalformedCredential)?;

    if !presented_scheme.eq_ignore_ascii_case(scheme) {
        return Err(AuthError::MalformedCredential);
    }

    Ok(credential)
}

/// Constant-time comparison to avoid timing side-channels.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
