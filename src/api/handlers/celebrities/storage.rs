//! Database helpers for contest entrants.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::handlers::PageWindow;

use super::types::{CelebrityPayload, CelebrityRecord, CelebrityUpdate, SocialLink};

fn row_to_record(row: &PgRow) -> CelebrityRecord {
    let Json(social_links) = row.get::<Json<Vec<SocialLink>>, _>("social_links");
    CelebrityRecord {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        description: row.get("description"),
        category: row.get("category"),
        social_links,
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub(super) async fn count_celebrities(pool: &PgPool, search: Option<&str>) -> Result<i64> {
    let query = r"
        SELECT COUNT(*) AS count
        FROM celebrities
        WHERE $1::text IS NULL OR name ILIKE '%' || $1 || '%'
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(query)
        .bind(search)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to count celebrities")?;
    Ok(row.get("count"))
}

pub(super) async fn list_celebrities(
    pool: &PgPool,
    window: &PageWindow,
) -> Result<Vec<CelebrityRecord>> {
    let query = r"
        SELECT id, name, image, description, category, social_links, is_active,
               created_at, updated_at
        FROM celebrities
        WHERE $1::text IS NULL OR name ILIKE '%' || $1 || '%'
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let rows = sqlx::query(query)
        .bind(window.search.as_deref())
        .bind(i64::from(window.limit))
        .bind(window.offset)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list celebrities")?;
    Ok(rows.iter().map(row_to_record).collect())
}

pub(super) async fn insert_celebrity(
    pool: &PgPool,
    payload: &CelebrityPayload,
) -> Result<CelebrityRecord> {
    let query = r"
        INSERT INTO celebrities (name, image, description, category, social_links, is_active)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, image, description, category, social_links, is_active,
                  created_at, updated_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT"
    );
    let row = sqlx::query(query)
        .bind(&payload.name)
        .bind(&payload.image)
        .bind(&payload.description)
        .bind(&payload.category)
        .bind(Json(&payload.social_links))
        .bind(payload.is_active)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert celebrity")?;
    Ok(row_to_record(&row))
}

/// Partial update; absent fields keep their stored values via COALESCE.
pub(super) async fn update_celebrity(
    pool: &PgPool,
    id: Uuid,
    update: &CelebrityUpdate,
) -> Result<Option<CelebrityRecord>> {
    let query = r"
        UPDATE celebrities
        SET name = COALESCE($2, name),
            image = COALESCE($3, image),
            description = COALESCE($4, description),
            category = COALESCE($5, category),
            social_links = COALESCE($6, social_links),
            is_active = COALESCE($7, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, image, description, category, social_links, is_active,
                  created_at, updated_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE"
    );
    let row = sqlx::query(query)
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.image.as_deref())
        .bind(update.description.as_deref())
        .bind(update.category.as_deref())
        .bind(update.social_links.as_ref().map(Json))
        .bind(update.is_active)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update celebrity")?;
    Ok(row.as_ref().map(row_to_record))
}

/// Delete an entrant. Votes cascade at the schema level.
pub(super) async fn delete_celebrity(pool: &PgPool, id: Uuid) -> Result<bool> {
    let query = "DELETE FROM celebrities WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE"
    );
    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete celebrity")?;
    Ok(result.rows_affected() > 0)
}
