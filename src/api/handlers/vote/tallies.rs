//! Read side of the contest: the tally board and per-device status checks.

use axum::{Json, extract::Extension, http::HeaderMap, response::IntoResponse};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::{error::ApiError, handlers::client_ip_or_unknown};

use super::{
    fingerprint::device_fingerprint_hash,
    state::VoteState,
    storage,
    types::{TallyBoard, VoteStatus, VoteStatusRequest},
};

#[utoipa::path(
    get,
    path = "/vote",
    responses(
        (status = 200, description = "Active entrants ordered by tally", body = TallyBoard)
    ),
    tag = "vote"
)]
pub async fn list_tallies(pool: Extension<PgPool>) -> Result<impl IntoResponse, ApiError> {
    let celebrities = storage::list_tallies(&pool).await?;
    let total_votes = celebrities.iter().map(|entry| entry.vote_count).sum();

    Ok(Json(TallyBoard {
        celebrities,
        total_votes,
    }))
}

/// Idempotent status check: no rate limit, no insert. The client uses this
/// to render "already voted" state without re-submitting.
#[utoipa::path(
    put,
    path = "/vote",
    request_body = VoteStatusRequest,
    responses(
        (status = 200, description = "Whether this device has voted", body = VoteStatus),
        (status = 400, description = "Missing fingerprint")
    ),
    tag = "vote"
)]
pub async fn vote_status(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    vote_state: Extension<Arc<VoteState>>,
    payload: Option<Json<VoteStatusRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };
    if request.fingerprint.trim().is_empty() {
        return Err(ApiError::Validation("Fingerprint is required".to_string()));
    }

    let client_ip = client_ip_or_unknown(&headers);
    let hash = device_fingerprint_hash(
        &request.fingerprint,
        &client_ip,
        vote_state.config().contest_salt(),
    );

    let voted_for = storage::find_vote_by_hash(&pool, &hash).await?;

    Ok(Json(VoteStatus {
        has_voted: voted_for.is_some(),
        voted_for,
    }))
}
