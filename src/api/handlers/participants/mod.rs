//! Marathon participant registration and the admin listing behind it.

pub mod storage;
pub mod types;

use axum::{
    Json,
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api::{
    error::ApiError,
    handlers::{
        PageQuery, Pagination,
        auth::{principal::require_session, state::AuthState},
        client_ip_or_unknown,
        rate_limit::{RateDecision, RateLimiter},
    },
};

use self::types::{ParticipantList, RegistrationRequest};

/// Per-IP limiter for the public registration endpoint.
#[derive(Clone)]
pub struct RegistrationLimiter(Arc<RateLimiter>);

impl RegistrationLimiter {
    const MAX_REQUESTS: u32 = 5;
    const WINDOW: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(RateLimiter::new(Self::MAX_REQUESTS, Self::WINDOW)))
    }

    pub(crate) fn register(&self, key: &str) -> RateDecision {
        self.0.register(key)
    }

    /// Shared handle for the background sweeper.
    pub(crate) fn handle(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.0)
    }
}

impl Default for RegistrationLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Participant registered", body = types::RegistrationAccepted),
        (status = 400, description = "Validation error with per-field details"),
        (status = 429, description = "Rate limited")
    ),
    tag = "registration"
)]
pub async fn register(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    limiter: Extension<RegistrationLimiter>,
    payload: Option<Json<RegistrationRequest>>,
) -> Result<Response, ApiError> {
    let client_ip = client_ip_or_unknown(&headers);
    let decision = limiter.register(&client_ip);
    if !decision.allowed {
        return Err(ApiError::RateLimited {
            retry_after_seconds: decision.retry_after_seconds.unwrap_or(60),
        });
    }

    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let sanitized = match request.sanitize() {
        Ok(sanitized) => sanitized,
        Err(errors) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid registration data",
                    "errors": errors,
                })),
            )
                .into_response());
        }
    };

    let accepted = storage::insert_participant(&pool, &sanitized).await?;
    info!(participant = %accepted.id, "Participant registered");

    Ok((StatusCode::CREATED, Json(accepted)).into_response())
}

#[utoipa::path(
    get,
    path = "/admin/participants",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated participants", body = ParticipantList),
        (status = 401, description = "Missing or invalid session")
    ),
    tag = "admin"
)]
pub async fn list_participants(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    query: Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_session(&headers, &auth_state)?;

    let window = query.window();
    let total = storage::count_participants(&pool, window.search.as_deref()).await?;
    let data = storage::list_participants(&pool, &window).await?;

    Ok(Json(ParticipantList {
        data,
        pagination: Pagination::new(&window, total),
    }))
}
