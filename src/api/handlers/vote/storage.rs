//! Vote ledger and tally queries.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row, types::Json};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::handlers::{celebrities::types::SocialLink, is_unique_violation};

use super::types::CelebrityTally;

/// Outcome of attempting to append to the vote ledger.
#[derive(Debug)]
pub(super) enum InsertVoteOutcome {
    Inserted,
    /// The UNIQUE constraint on the fingerprint hash rejected the row: an
    /// earlier or concurrent vote with the same hash already committed.
    DuplicateHash,
}

pub(super) struct NewVote<'a> {
    pub(super) celebrity_id: Uuid,
    pub(super) device_fingerprint: &'a str,
    pub(super) ip_address: &'a str,
    pub(super) user_agent: Option<&'a str>,
    pub(super) screen_resolution: Option<&'a str>,
    pub(super) timezone: Option<&'a str>,
    pub(super) language: Option<&'a str>,
}

pub(super) async fn celebrity_exists(pool: &PgPool, id: Uuid) -> Result<bool> {
    let query = "SELECT 1 FROM celebrities WHERE id = $1 LIMIT 1";
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
        .context("failed to check celebrity")?;
    Ok(row.is_some())
}

/// Who this fingerprint hash voted for, if it has voted.
pub(super) async fn find_vote_by_hash(
    pool: &PgPool,
    device_fingerprint: &str,
) -> Result<Option<Uuid>> {
    let query = "SELECT celebrity_id FROM votes WHERE device_fingerprint = $1 LIMIT 1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(query)
        .bind(device_fingerprint)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup vote by fingerprint hash")?;
    Ok(row.map(|row| row.get("celebrity_id")))
}

/// Append to the ledger. The constraint, not the caller's preceding read,
/// is the duplicate-vote guarantee; a unique violation here is an expected
/// outcome, not an error.
pub(super) async fn insert_vote(pool: &PgPool, vote: &NewVote<'_>) -> Result<InsertVoteOutcome> {
    let query = r"
        INSERT INTO votes
            (celebrity_id, device_fingerprint, ip_address, user_agent,
             screen_resolution, timezone, language)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT"
    );
    let result = sqlx::query(query)
        .bind(vote.celebrity_id)
        .bind(vote.device_fingerprint)
        .bind(vote.ip_address)
        .bind(vote.user_agent)
        .bind(vote.screen_resolution)
        .bind(vote.timezone)
        .bind(vote.language)
        .execute(pool)
        .instrument(span)
        .await;

    match result {
        Ok(_) => Ok(InsertVoteOutcome::Inserted),
        Err(err) if is_unique_violation(&err) => Ok(InsertVoteOutcome::DuplicateHash),
        Err(err) => Err(err).context("failed to insert vote"),
    }
}

/// Current tally for one entrant, projected from the ledger.
pub(super) async fn count_votes(pool: &PgPool, celebrity_id: Uuid) -> Result<i64> {
    let query = "SELECT COUNT(*) AS count FROM votes WHERE celebrity_id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(query)
        .bind(celebrity_id)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to count votes")?;
    Ok(row.get("count"))
}

/// Active entrants with their tallies, highest first. Counts are computed
/// on every read; there is no cached counter to drift from the ledger.
pub(super) async fn list_tallies(pool: &PgPool) -> Result<Vec<CelebrityTally>> {
    let query = r"
        SELECT c.id, c.name, c.image, c.description, c.category, c.social_links,
               COUNT(v.id) AS vote_count
        FROM celebrities c
        LEFT JOIN votes v ON v.celebrity_id = c.id
        WHERE c.is_active = TRUE
        GROUP BY c.id
        ORDER BY COUNT(v.id) DESC, c.created_at ASC
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list tallies")?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let Json(social_links) = row.get::<Json<Vec<SocialLink>>, _>("social_links");
            CelebrityTally {
                id: row.get("id"),
                name: row.get("name"),
                image: row.get("image"),
                description: row.get("description"),
                category: row.get("category"),
                social_links,
                vote_count: row.get("vote_count"),
            }
        })
        .collect())
}
