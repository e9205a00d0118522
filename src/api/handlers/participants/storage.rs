//! Database helpers for marathon participants.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;

use crate::api::handlers::PageWindow;

use super::types::{ParticipantRecord, RegistrationAccepted, SanitizedRegistration};

pub(super) async fn insert_participant(
    pool: &PgPool,
    registration: &SanitizedRegistration,
) -> Result<RegistrationAccepted> {
    let query = r"
        INSERT INTO participants (name, phone_number, residence, health_condition, sport_level)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT"
    );
    let row = sqlx::query(query)
        .bind(&registration.name)
        .bind(&registration.phone_number)
        .bind(&registration.residence)
        .bind(&registration.health_condition)
        .bind(&registration.sport_level)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert participant")?;

    Ok(RegistrationAccepted {
        id: row.get("id"),
        name: row.get("name"),
    })
}

pub(super) async fn count_participants(pool: &PgPool, search: Option<&str>) -> Result<i64> {
    let query = r"
        SELECT COUNT(*) AS count
        FROM participants
        WHERE $1::text IS NULL
           OR name ILIKE '%' || $1 || '%'
           OR phone_number ILIKE '%' || $1 || '%'
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
        .context("failed to count participants")?;
    Ok(row.get("count"))
}

pub(super) async fn list_participants(
    pool: &PgPool,
    window: &PageWindow,
) -> Result<Vec<ParticipantRecord>> {
    let query = r"
        SELECT id, name, phone_number, residence, health_condition, sport_level, created_at
        FROM participants
        WHERE $1::text IS NULL
           OR name ILIKE '%' || $1 || '%'
           OR phone_number ILIKE '%' || $1 || '%'
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
        .context("failed to list participants")?;

    Ok(rows
        .into_iter()
        .map(|row| ParticipantRecord {
            id: row.get("id"),
            name: row.get("name"),
            phone_number: row.get("phone_number"),
            residence: row.get("residence"),
            health_condition: row.get("health_condition"),
            sport_level: row.get("sport_level"),
            created_at: row.get("created_at"),
        })
        .collect())
}
