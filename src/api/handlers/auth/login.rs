//! Admin login: validation, throttling, lockout, credential verification,
//! and session issuance.
//!
//! Failure responses are deliberately uniform: an unknown username and a
//! wrong password share the same message, the same throttle bookkeeping,
//! and a randomized delay, so neither timing nor wording leaks whether an
//! account exists.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use rand::Rng;
use regex::Regex;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{error::ApiError, handlers::client_ip_or_unknown};

use super::{
    password,
    session::{issue_pair, session_cookies},
    state::AuthState,
    storage,
    types::{AdminProfile, LoginRequest, SessionUser},
};

const GENERIC_LOGIN_ERROR: &str = "Invalid username or password";

pub(super) fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_]{3,50}$").is_ok_and(|re| re.is_match(username))
}

pub(super) fn valid_password_length(password: &str) -> bool {
    (8..=128).contains(&password.chars().count())
}

/// Randomized delay on failed logins to blunt timing probes and slow
/// credential stuffing.
async fn failure_delay() {
    let jitter_ms = rand::thread_rng().gen_range(500..=1000);
    tokio::time::sleep(std::time::Duration::from_millis(jitter_ms)).await;
}

fn generic_failure(remaining_attempts: u32) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": GENERIC_LOGIN_ERROR,
            "remainingAttempts": remaining_attempts,
        })),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; session cookies set", body = SessionUser),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 423, description = "Account locked"),
        (status = 429, description = "Rate limited")
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let username = request.username.trim().to_lowercase();
    if !valid_username(&username) {
        return Err(ApiError::Validation(
            "Username must be 3-50 letters, digits, or underscores".to_string(),
        ));
    }
    if !valid_password_length(&request.password) {
        return Err(ApiError::Validation(
            "Password must be 8-128 characters".to_string(),
        ));
    }

    let client_ip = client_ip_or_unknown(&headers);
    let throttle_key = format!("{client_ip}:{username}");

    let decision = auth_state.throttle().check(&throttle_key);
    if !decision.allowed {
        return Err(ApiError::RateLimited {
            retry_after_seconds: decision.retry_after_seconds.unwrap_or(60),
        });
    }

    let Some(admin) = storage::find_admin_for_login(&pool, &username).await? else {
        auth_state.throttle().record_failure(&throttle_key);
        // Unknown usernames burn a hash verification and share the generic error.
        password::equalize_timing(&request.password);
        failure_delay().await;
        return Ok(generic_failure(decision.remaining_attempts.saturating_sub(1)));
    };

    if let Some(locked_until) = admin.locked_until {
        if locked_until > Utc::now() {
            return Err(ApiError::Locked { locked_until });
        }
    }

    if !password::verify_password(&request.password, &admin.password_hash) {
        auth_state.throttle().record_failure(&throttle_key);

        let attempts = admin.failed_login_attempts + 1;
        let lock_until = (attempts >= auth_state.config().failed_logins_before_lock())
            .then(|| Utc::now() + Duration::minutes(auth_state.config().lockout_minutes()));
        if lock_until.is_some() {
            warn!(username = %admin.username, "Account locked after repeated failures");
        }
        storage::record_login_failure(&pool, admin.id, attempts, lock_until).await?;

        failure_delay().await;
        return Ok(generic_failure(decision.remaining_attempts.saturating_sub(1)));
    }

    // Success resets both the in-memory window and the account counter.
    auth_state.throttle().clear(&throttle_key);
    storage::record_login_success(&pool, admin.id).await?;

    let profile = AdminProfile {
        id: admin.id,
        username: admin.username,
        display_name: admin.display_name,
        role: admin.role,
        last_login_at: Some(Utc::now()),
    };

    let (access, refresh) = issue_pair(&auth_state, &profile)
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("failed to issue tokens: {err}")))?;
    let cookies = session_cookies(&auth_state, &access, &refresh).map_err(|err| {
        ApiError::Internal(anyhow::anyhow!("failed to build session cookies: {err}"))
    })?;

    info!(username = %profile.username, "Admin logged in");

    Ok((StatusCode::OK, cookies, Json(SessionUser { user: profile })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_username_bounds() {
        assert!(valid_username("root"));
        assert!(valid_username("Admin_01"));
        assert!(valid_username("abc"));
        assert!(valid_username(&"a".repeat(50)));

        assert!(!valid_username("ab"));
        assert!(!valid_username(&"a".repeat(51)));
        assert!(!valid_username("with space"));
        assert!(!valid_username("semi;colon"));
        assert!(!valid_username("'; DROP TABLE admins;--"));
    }

    #[test]
    fn valid_password_length_bounds() {
        assert!(valid_password_length("12345678"));
        assert!(valid_password_length(&"p".repeat(128)));

        assert!(!valid_password_length("1234567"));
        assert!(!valid_password_length(&"p".repeat(129)));
    }
}
