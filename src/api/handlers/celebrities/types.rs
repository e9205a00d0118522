//! Request/response types for contest entrant management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::handlers::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Twitter,
    Youtube,
    Tiktok,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SocialLink {
    pub platform: SocialPlatform,
    pub url: String,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CelebrityRecord {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub description: String,
    pub category: String,
    pub social_links: Vec<SocialLink>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct CelebrityList {
    pub data: Vec<CelebrityRecord>,
    pub pagination: Pagination,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CelebrityPayload {
    pub name: String,
    pub image: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

const fn default_is_active() -> bool {
    true
}

/// Partial update; absent fields keep their stored values.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CelebrityUpdate {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub social_links: Option<Vec<SocialLink>>,
    pub is_active: Option<bool>,
}

impl CelebrityPayload {
    pub(super) fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_image(&self.image)?;
        validate_description(&self.description)?;
        validate_category(&self.category)?;
        validate_social_links(&self.social_links)
    }
}

impl CelebrityUpdate {
    pub(super) fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(image) = &self.image {
            validate_image(image)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(category) = &self.category {
            validate_category(category)?;
        }
        if let Some(social_links) = &self.social_links {
            validate_social_links(social_links)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    if !(2..=255).contains(&name.chars().count()) {
        return Err("Name must be 2-255 characters".to_string());
    }
    Ok(())
}

/// Images are either local upload paths or absolute URLs.
fn validate_image(image: &str) -> Result<(), String> {
    if image.chars().count() > 500 {
        return Err("Image link too long".to_string());
    }
    if image.starts_with('/') {
        return Ok(());
    }
    Url::parse(image)
        .map(|_| ())
        .map_err(|_| "Invalid image link".to_string())
}

fn validate_description(description: &str) -> Result<(), String> {
    if !(10..=1000).contains(&description.chars().count()) {
        return Err("Description must be 10-1000 characters".to_string());
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), String> {
    if !(2..=100).contains(&category.chars().count()) {
        return Err("Category must be 2-100 characters".to_string());
    }
    Ok(())
}

fn validate_social_links(links: &[SocialLink]) -> Result<(), String> {
    for link in links {
        if Url::parse(&link.url).is_err() {
            return Err("Invalid social link URL".to_string());
        }
    }
    Ok(())
}
