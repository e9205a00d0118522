//! Error taxonomy for the HTTP surface.
//!
//! Handlers return `ApiError` for every non-success outcome so status codes
//! and bodies stay uniform. Internal details are logged server-side and
//! never reach the client.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Not authenticated, please log in")]
    Unauthenticated,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Insufficient privileges")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Account locked")]
    Locked { locked_until: DateTime<Utc> },

    #[error("Too many requests, try again later")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Already voted")]
    AlreadyVoted { voted_for: Uuid },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not authenticated, please log in" })),
            )
                .into_response(),
            Self::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Session expired, please log in again" })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Insufficient privileges" })),
            )
                .into_response(),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{what} not found") })),
            )
                .into_response(),
            Self::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            Self::Locked { locked_until } => {
                // Lockout responses disclose the remaining time on purpose.
                let remaining = locked_until
                    .signed_duration_since(Utc::now())
                    .num_seconds()
                    .max(0);
                let remaining_minutes = remaining / 60 + i64::from(remaining % 60 != 0);
                (
                    StatusCode::LOCKED,
                    Json(json!({
                        "error": format!(
                            "Account locked, try again in {remaining_minutes} minutes"
                        ),
                        "lockedUntil": locked_until,
                    })),
                )
                    .into_response()
            }
            Self::RateLimited {
                retry_after_seconds,
            } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "error": "Too many requests, try again later",
                        "retryAfter": retry_after_seconds,
                    })),
                )
                    .into_response();
                if let Ok(value) = HeaderValue::from_str(&retry_after_seconds.to_string()) {
                    response.headers_mut().insert(RETRY_AFTER, value);
                }
                response
            }
            Self::AlreadyVoted { voted_for } => (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "You have already voted, one vote per device",
                    "alreadyVoted": true,
                    "votedFor": voted_for,
                })),
            )
                .into_response(),
            Self::Internal(err) => {
                error!("Internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Something went wrong, please try again later" })),
                )
                    .into_response()
            }
        }
    }
}
