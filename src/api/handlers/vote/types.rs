//! Request/response types for the voting contest.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::handlers::celebrities::types::SocialLink;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub celebrity_id: String,
    pub fingerprint: String,
    pub screen_resolution: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VoteAccepted {
    pub celebrity_id: Uuid,
    pub new_vote_count: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VoteStatusRequest {
    pub fingerprint: String,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub has_voted: bool,
    pub voted_for: Option<Uuid>,
}

/// One entrant with its live tally.
#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CelebrityTally {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub description: String,
    pub category: String,
    pub social_links: Vec<SocialLink>,
    pub vote_count: i64,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TallyBoard {
    pub celebrities: Vec<CelebrityTally>,
    pub total_votes: i64,
}
