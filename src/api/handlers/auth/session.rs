//! Cookie-based session transport: set/clear cookies, logout, current
//! profile, and refresh rotation.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::api::error::ApiError;

use super::{
    principal::{cookie_value, require_session},
    state::AuthState,
    storage,
    tokens::{ACCESS_TTL_SECONDS, REFRESH_TTL_SECONDS, VerifiedToken},
    types::{AdminProfile, SessionUser},
};

pub(super) const ACCESS_COOKIE: &str = "access_token";
pub(super) const REFRESH_COOKIE: &str = "refresh_token";
/// The refresh cookie never travels with regular API requests.
const REFRESH_COOKIE_PATH: &str = "/auth/refresh";

fn build_cookie(
    name: &str,
    value: &str,
    path: &str,
    max_age: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path={path}; HttpOnly; SameSite=Strict; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build `Set-Cookie` headers for a fresh access/refresh pair.
pub(super) fn session_cookies(
    auth: &AuthState,
    access: &str,
    refresh: &str,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let secure = auth.config().cookie_secure();
    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        build_cookie(ACCESS_COOKIE, access, "/", ACCESS_TTL_SECONDS, secure)?,
    );
    headers.append(
        SET_COOKIE,
        build_cookie(
            REFRESH_COOKIE,
            refresh,
            REFRESH_COOKIE_PATH,
            REFRESH_TTL_SECONDS,
            secure,
        )?,
    );
    Ok(headers)
}

/// Overwrite both cookies with empty values and zero max-age.
pub(super) fn clear_session_cookies(auth: &AuthState) -> HeaderMap {
    let secure = auth.config().cookie_secure();
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = build_cookie(ACCESS_COOKIE, "", "/", 0, secure) {
        headers.append(SET_COOKIE, cookie);
    }
    if let Ok(cookie) = build_cookie(REFRESH_COOKIE, "", REFRESH_COOKIE_PATH, 0, secure) {
        headers.append(SET_COOKIE, cookie);
    }
    headers
}

/// Issue a matching access/refresh pair for an admin.
pub(super) fn issue_pair(
    auth: &AuthState,
    admin: &AdminProfile,
) -> Result<(String, String), jsonwebtoken::errors::Error> {
    let access = auth
        .tokens()
        .issue_access(admin.id, &admin.username, admin.role)?;
    let refresh = auth
        .tokens()
        .issue_refresh(admin.id, &admin.username, admin.role)?;
    Ok((access, refresh))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cookies cleared")
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Tokens are stateless; logout is clearing the cookies.
    let headers = clear_session_cookies(&auth_state);
    (StatusCode::OK, headers, Json(json!({ "success": true })))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current admin profile", body = SessionUser),
        (status = 401, description = "Missing or invalid session")
    ),
    tag = "auth"
)]
pub async fn me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&headers, &auth_state)?;

    // Fresh read so deactivation and role changes show up immediately.
    let profile = storage::find_active_admin(&pool, claims.sub)
        .await?
        .ok_or(ApiError::NotFound("Admin"))?;

    Ok(Json(SessionUser { user: profile }))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Session rotated", body = SessionUser),
        (status = 401, description = "Refresh rejected; cookies cleared")
    ),
    tag = "auth"
)]
pub async fn refresh(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    match rotate_session(&headers, &pool, &auth_state).await {
        Ok(response) => response,
        Err(message) => {
            // Fail closed: any failure drops both cookies, never a half-valid session.
            let cleared = clear_session_cookies(&auth_state);
            (
                StatusCode::UNAUTHORIZED,
                cleared,
                Json(json!({ "error": message })),
            )
                .into_response()
        }
    }
}

async fn rotate_session(
    headers: &HeaderMap,
    pool: &PgPool,
    auth: &AuthState,
) -> Result<Response, &'static str> {
    let token = cookie_value(headers, REFRESH_COOKIE).ok_or("Missing refresh token")?;

    let claims = match auth.tokens().verify(&token) {
        Some(VerifiedToken::Refresh(claims)) => claims,
        // An access token is not a refresh token, even when signature-valid.
        Some(VerifiedToken::Access(_)) | None => return Err("Invalid refresh token"),
    };

    let admin = match storage::find_active_admin(pool, claims.sub).await {
        Ok(Some(admin)) => admin,
        Ok(None) => return Err("Admin no longer active"),
        Err(err) => {
            error!("Failed to load admin during refresh: {err:#}");
            return Err("Session refresh failed");
        }
    };

    let (access, refresh) = match issue_pair(auth, &admin) {
        Ok(pair) => pair,
        Err(err) => {
            error!("Failed to issue tokens during refresh: {err}");
            return Err("Session refresh failed");
        }
    };
    let Ok(cookies) = session_cookies(auth, &access, &refresh) else {
        return Err("Session refresh failed");
    };

    Ok((StatusCode::OK, cookies, Json(SessionUser { user: admin })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::state::AuthConfig;
    use secrecy::SecretString;

    fn auth_state(frontend: &str) -> AuthState {
        AuthState::new(AuthConfig::new(
            frontend.to_string(),
            SecretString::from("test-secret".to_string()),
        ))
    }

    fn cookies_as_strings(headers: &HeaderMap) -> Vec<String> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn session_cookies_scope_and_attributes() {
        let auth = auth_state("http://localhost:3000");
        let headers = session_cookies(&auth, "acc", "ref").expect("cookies should build");
        let cookies = cookies_as_strings(&headers);
        assert_eq!(cookies.len(), 2);

        let access = &cookies[0];
        assert!(access.starts_with("access_token=acc"));
        assert!(access.contains("Path=/;"));
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("SameSite=Strict"));
        assert!(access.contains("Max-Age=900"));
        assert!(!access.contains("Secure"));

        let refresh = &cookies[1];
        assert!(refresh.starts_with("refresh_token=ref"));
        assert!(refresh.contains("Path=/auth/refresh"));
        assert!(refresh.contains("Max-Age=604800"));
    }

    #[test]
    fn https_frontend_marks_cookies_secure() {
        let auth = auth_state("https://hala-events.iq");
        let headers = session_cookies(&auth, "acc", "ref").expect("cookies should build");
        for cookie in cookies_as_strings(&headers) {
            assert!(cookie.contains("; Secure"), "missing Secure in {cookie}");
        }
    }

    #[test]
    fn clear_session_cookies_zeroes_both() {
        let auth = auth_state("http://localhost:3000");
        let headers = clear_session_cookies(&auth);
        let cookies = cookies_as_strings(&headers);
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("access_token=;"));
        assert!(cookies[1].starts_with("refresh_token=;"));
        for cookie in &cookies {
            assert!(cookie.contains("Max-Age=0"));
        }
    }
}
