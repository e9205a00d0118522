//! Session guard for protected admin endpoints.

use axum::http::{HeaderMap, header::COOKIE};

use crate::api::error::ApiError;

use super::{
    session::ACCESS_COOKIE,
    state::AuthState,
    tokens::{TokenClaims, VerifiedToken},
    types::AdminRole,
};

/// Extract and verify the access session from request cookies.
///
/// Missing cookie → not authenticated; present but unverifiable (bad
/// signature, expired, or a refresh token smuggled in) → session expired.
pub(crate) fn require_session(
    headers: &HeaderMap,
    auth: &AuthState,
) -> Result<TokenClaims, ApiError> {
    let Some(token) = cookie_value(headers, ACCESS_COOKIE) else {
        return Err(ApiError::Unauthenticated);
    };
    match auth.tokens().verify(&token) {
        Some(VerifiedToken::Access(claims)) => Ok(claims),
        Some(VerifiedToken::Refresh(_)) | None => Err(ApiError::SessionExpired),
    }
}

/// Like [`require_session`], plus a role allow-list check.
pub(crate) fn require_role(
    headers: &HeaderMap,
    auth: &AuthState,
    allowed: &[AdminRole],
) -> Result<TokenClaims, ApiError> {
    let claims = require_session(headers, auth)?;
    if allowed.contains(&claims.role) {
        Ok(claims)
    } else {
        Err(ApiError::Forbidden)
    }
}

pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}
