//! One-time creation of the initial `super_admin` account.
//!
//! Gated by a deployment secret in the `x-seed-secret` header; when no
//! secret is configured the endpoint is inert and always responds 403.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiError;

use super::{
    login::{valid_password_length, valid_username},
    password,
    state::AuthState,
    storage::{self, SeedOutcome},
    types::{AdminRole, SeedRequest, SessionUser},
};

const SEED_SECRET_HEADER: &str = "x-seed-secret";

#[utoipa::path(
    post,
    path = "/admin/seed",
    request_body = SeedRequest,
    responses(
        (status = 201, description = "Super admin created", body = SessionUser),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Seed secret missing or wrong"),
        (status = 409, description = "Username already exists")
    ),
    tag = "admin"
)]
pub async fn seed_admin(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SeedRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(expected) = auth_state.config().seed_secret() else {
        return Err(ApiError::Forbidden);
    };
    let provided = headers
        .get(SEED_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    if provided != Some(expected.expose_secret()) {
        return Err(ApiError::Forbidden);
    }

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
    let display_name = request.display_name.trim();
    if display_name.is_empty() || display_name.chars().count() > 100 {
        return Err(ApiError::Validation(
            "Display name must be 1-100 characters".to_string(),
        ));
    }

    let password_hash = password::hash_password(&request.password)
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("failed to hash password: {err}")))?;

    match storage::insert_admin(
        &pool,
        &username,
        &password_hash,
        display_name,
        AdminRole::SuperAdmin,
    )
    .await?
    {
        SeedOutcome::Created(profile) => {
            info!(username = %profile.username, "Seeded super_admin account");
            Ok((StatusCode::CREATED, Json(SessionUser { user: profile })))
        }
        SeedOutcome::Conflict => Err(ApiError::Conflict("Username already exists".to_string())),
    }
}
