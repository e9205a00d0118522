//! Database helpers for admin accounts.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::handlers::is_unique_violation;

use super::types::{AdminProfile, AdminRole};

/// Fields needed to evaluate a login attempt.
pub(super) struct AdminAuthRecord {
    pub(super) id: Uuid,
    pub(super) username: String,
    pub(super) display_name: String,
    pub(super) role: AdminRole,
    pub(super) password_hash: String,
    pub(super) failed_login_attempts: i32,
    pub(super) locked_until: Option<DateTime<Utc>>,
}

/// Outcome when attempting to create an admin account.
#[derive(Debug)]
pub(super) enum SeedOutcome {
    Created(AdminProfile),
    Conflict,
}

fn parse_role(value: &str) -> Result<AdminRole> {
    AdminRole::parse(value).ok_or_else(|| anyhow!("unknown admin role: {value}"))
}

/// Look up an active admin by case-folded username for login.
pub(super) async fn find_admin_for_login(
    pool: &PgPool,
    username: &str,
) -> Result<Option<AdminAuthRecord>> {
    let query = r"
        SELECT id, username, display_name, role::text AS role, password_hash,
               failed_login_attempts, locked_until
        FROM admins
        WHERE username = $1
          AND is_active = TRUE
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup admin for login")?;

    row.map(|row| {
        let role: String = row.get("role");
        Ok(AdminAuthRecord {
            id: row.get("id"),
            username: row.get("username"),
            display_name: row.get("display_name"),
            role: parse_role(&role)?,
            password_hash: row.get("password_hash"),
            failed_login_attempts: row.get("failed_login_attempts"),
            locked_until: row.get("locked_until"),
        })
    })
    .transpose()
}

/// Load the profile of an active admin by id (used by /auth/me and refresh).
pub(super) async fn find_active_admin(pool: &PgPool, id: Uuid) -> Result<Option<AdminProfile>> {
    let query = r"
        SELECT id, username, display_name, role::text AS role, last_login_at
        FROM admins
        WHERE id = $1
          AND is_active = TRUE
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup admin")?;

    row.map(|row| {
        let role: String = row.get("role");
        Ok(AdminProfile {
            id: row.get("id"),
            username: row.get("username"),
            display_name: row.get("display_name"),
            role: parse_role(&role)?,
            last_login_at: row.get("last_login_at"),
        })
    })
    .transpose()
}

/// Persist a failed attempt; `locked_until` is set when the caller decided
/// the account crossed the lockout threshold.
pub(super) async fn record_login_failure(
    pool: &PgPool,
    id: Uuid,
    failed_login_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
) -> Result<()> {
    let query = r"
        UPDATE admins
        SET failed_login_attempts = $2,
            locked_until = $3,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE"
    );
    sqlx::query(query)
        .bind(id)
        .bind(failed_login_attempts)
        .bind(locked_until)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to record login failure")?;
    Ok(())
}

/// Successful login: stamp the time and reset the failure bookkeeping.
pub(super) async fn record_login_success(pool: &PgPool, id: Uuid) -> Result<()> {
    let query = r"
        UPDATE admins
        SET last_login_at = NOW(),
            failed_login_attempts = 0,
            locked_until = NULL,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE"
    );
    sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to record login success")?;
    Ok(())
}

/// Create an admin account; username collisions surface as a conflict
/// outcome rather than an error.
pub(super) async fn insert_admin(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    display_name: &str,
    role: AdminRole,
) -> Result<SeedOutcome> {
    let query = r"
        INSERT INTO admins (username, password_hash, display_name, role)
        VALUES ($1, $2, $3, $4::admin_role)
        RETURNING id, username, display_name, role::text AS role, last_login_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT"
    );
    let row = sqlx::query(query)
        .bind(username)
        .bind(password_hash)
        .bind(display_name)
        .bind(role.as_str())
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => {
            let role: String = row.get("role");
            Ok(SeedOutcome::Created(AdminProfile {
                id: row.get("id"),
                username: row.get("username"),
                display_name: row.get("display_name"),
                role: parse_role(&role)?,
                last_login_at: row.get("last_login_at"),
            }))
        }
        Err(err) if is_unique_violation(&err) => Ok(SeedOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert admin"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_role_accepts_known_roles() {
        assert!(matches!(parse_role("super_admin"), Ok(AdminRole::SuperAdmin)));
        assert!(matches!(parse_role("admin"), Ok(AdminRole::Admin)));
        assert!(matches!(parse_role("moderator"), Ok(AdminRole::Moderator)));
    }

    #[test]
    fn parse_role_rejects_unknown() {
        let err = parse_role("root").expect_err("should reject");
        assert!(err.to_string().contains("unknown admin role"));
    }
}
