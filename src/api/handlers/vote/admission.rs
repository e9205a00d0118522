//! Vote admission: the write path of the contest.
//!
//! Per submission, strictly in order: validate → rate-limit → hash →
//! target check → read-then-insert. The read is only a fast path for a
//! friendly duplicate answer; two concurrent requests with the same hash
//! can both pass it, and the UNIQUE constraint on the ledger settles the
//! race. The loser's constraint violation is translated into the same 409
//! a sequential duplicate gets, never a 500.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::{error::ApiError, handlers::client_ip_or_unknown};

use super::{
    fingerprint::{MIN_FINGERPRINT_LENGTH, device_fingerprint_hash},
    state::VoteState,
    storage::{self, InsertVoteOutcome, NewVote},
    types::{VoteAccepted, VoteRequest},
};

#[utoipa::path(
    post,
    path = "/vote",
    request_body = VoteRequest,
    responses(
        (status = 201, description = "Vote recorded", body = VoteAccepted),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Unknown celebrity"),
        (status = 409, description = "This device already voted"),
        (status = 429, description = "Rate limited")
    ),
    tag = "vote"
)]
pub async fn submit_vote(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    vote_state: Extension<Arc<VoteState>>,
    payload: Option<Json<VoteRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let Ok(celebrity_id) = Uuid::parse_str(request.celebrity_id.trim()) else {
        return Err(ApiError::Validation("Invalid celebrity id".to_string()));
    };
    if request.fingerprint.len() < MIN_FINGERPRINT_LENGTH {
        return Err(ApiError::Validation("Invalid fingerprint".to_string()));
    }

    let client_ip = client_ip_or_unknown(&headers);
    let decision = vote_state.vote_limiter().register(&client_ip);
    if !decision.allowed {
        return Err(ApiError::RateLimited {
            retry_after_seconds: decision.retry_after_seconds.unwrap_or(60),
        });
    }

    let hash = device_fingerprint_hash(
        &request.fingerprint,
        &client_ip,
        vote_state.config().contest_salt(),
    );

    if !storage::celebrity_exists(&pool, celebrity_id).await? {
        return Err(ApiError::NotFound("Celebrity"));
    }

    // Fast path: answer obvious duplicates without attempting the insert.
    if let Some(voted_for) = storage::find_vote_by_hash(&pool, &hash).await? {
        return Err(ApiError::AlreadyVoted { voted_for });
    }

    let user_agent = headers.get(USER_AGENT).and_then(|value| value.to_str().ok());
    let vote = NewVote {
        celebrity_id,
        device_fingerprint: &hash,
        ip_address: &client_ip,
        user_agent,
        screen_resolution: request.screen_resolution.as_deref(),
        timezone: request.timezone.as_deref(),
        language: request.language.as_deref(),
    };

    match storage::insert_vote(&pool, &vote).await? {
        InsertVoteOutcome::Inserted => {}
        InsertVoteOutcome::DuplicateHash => {
            // Lost the race between the read and the insert: report the
            // winning vote's target, same as any other duplicate.
            let voted_for = storage::find_vote_by_hash(&pool, &hash)
                .await?
                .unwrap_or(celebrity_id);
            return Err(ApiError::AlreadyVoted { voted_for });
        }
    }

    let new_vote_count = storage::count_votes(&pool, celebrity_id).await?;

    info!(celebrity = %celebrity_id, "Vote recorded");

    Ok((
        StatusCode::CREATED,
        Json(VoteAccepted {
            celebrity_id,
            new_vote_count,
        }),
    ))
}
