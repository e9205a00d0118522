//! Admin CRUD for contest entrants.

pub mod storage;
pub mod types;

use axum::{
    Json,
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::{
    error::ApiError,
    handlers::{
        PageQuery, Pagination,
        auth::{
            principal::{require_role, require_session},
            state::AuthState,
            types::AdminRole,
        },
    },
};

use self::types::{CelebrityList, CelebrityPayload, CelebrityRecord, CelebrityUpdate};

/// Roles allowed to create and update entrants.
const EDIT_ROLES: &[AdminRole] = &[AdminRole::Admin, AdminRole::SuperAdmin];
/// Deleting an entrant cascades to its votes, so it is `super_admin` only.
const DELETE_ROLES: &[AdminRole] = &[AdminRole::SuperAdmin];

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteQuery {
    /// Id of the entrant to delete
    pub id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/admin/celebrities",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated entrants", body = CelebrityList),
        (status = 401, description = "Missing or invalid session")
    ),
    tag = "admin"
)]
pub async fn list_celebrities(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    query: Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_session(&headers, &auth_state)?;

    let window = query.window();
    let total = storage::count_celebrities(&pool, window.search.as_deref()).await?;
    let data = storage::list_celebrities(&pool, &window).await?;

    Ok(Json(CelebrityList {
        data,
        pagination: Pagination::new(&window, total),
    }))
}

#[utoipa::path(
    post,
    path = "/admin/celebrities",
    request_body = CelebrityPayload,
    responses(
        (status = 201, description = "Entrant created", body = CelebrityRecord),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid session"),
        (status = 403, description = "Insufficient role")
    ),
    tag = "admin"
)]
pub async fn create_celebrity(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CelebrityPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&headers, &auth_state, EDIT_ROLES)?;

    let Some(Json(payload)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };
    payload.validate().map_err(ApiError::Validation)?;

    let record = storage::insert_celebrity(&pool, &payload).await?;
    info!(celebrity = %record.id, "Celebrity created");
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/admin/celebrities",
    request_body = CelebrityUpdate,
    responses(
        (status = 200, description = "Entrant updated", body = CelebrityRecord),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid session"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Unknown entrant")
    ),
    tag = "admin"
)]
pub async fn update_celebrity(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CelebrityUpdate>>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&headers, &auth_state, EDIT_ROLES)?;

    let Some(Json(update)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };
    let Ok(id) = Uuid::parse_str(update.id.trim()) else {
        return Err(ApiError::Validation("Invalid celebrity id".to_string()));
    };
    update.validate().map_err(ApiError::Validation)?;

    let record = storage::update_celebrity(&pool, id, &update)
        .await?
        .ok_or(ApiError::NotFound("Celebrity"))?;
    info!(celebrity = %record.id, "Celebrity updated");
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/admin/celebrities",
    params(DeleteQuery),
    responses(
        (status = 200, description = "Entrant deleted"),
        (status = 400, description = "Missing or malformed id"),
        (status = 401, description = "Missing or invalid session"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Unknown entrant")
    ),
    tag = "admin"
)]
pub async fn delete_celebrity(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    query: Query<DeleteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&headers, &auth_state, DELETE_ROLES)?;

    let Some(id) = query
        .id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    else {
        return Err(ApiError::Validation("Celebrity id is required".to_string()));
    };
    let Ok(id) = Uuid::parse_str(id) else {
        return Err(ApiError::Validation("Invalid celebrity id".to_string()));
    };

    if storage::delete_celebrity(&pool, id).await? {
        info!(celebrity = %id, "Celebrity deleted");
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(ApiError::NotFound("Celebrity"))
    }
}
