//! Request/response types for auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Administrative roles. Stored in Postgres as the `admin_role` enum and
/// carried in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Moderator,
}

impl AdminRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "super_admin" => Some(Self::SuperAdmin),
            "admin" => Some(Self::Admin),
            "moderator" => Some(Self::Moderator),
            _ => None,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: AdminRole,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Envelope for endpoints returning the authenticated admin.
#[derive(ToSchema, Serialize, Debug)]
pub struct SessionUser {
    pub user: AdminProfile,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequest {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn admin_role_round_trips_as_snake_case() -> Result<()> {
        let value = serde_json::to_value(AdminRole::SuperAdmin)?;
        assert_eq!(value, serde_json::json!("super_admin"));

        let decoded: AdminRole = serde_json::from_value(serde_json::json!("moderator"))?;
        assert_eq!(decoded, AdminRole::Moderator);
        Ok(())
    }

    #[test]
    fn admin_role_parse_matches_as_str() {
        for role in [AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::Moderator] {
            assert_eq!(AdminRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(AdminRole::parse("root"), None);
    }

    #[test]
    fn admin_profile_serializes_camel_case() -> Result<()> {
        let profile = AdminProfile {
            id: Uuid::nil(),
            username: "root".to_string(),
            display_name: "Root".to_string(),
            role: AdminRole::Admin,
            last_login_at: None,
        };
        let value = serde_json::to_value(&profile)?;
        assert!(value.get("displayName").is_some());
        assert!(value.get("lastLoginAt").is_some());
        assert!(value.get("display_name").is_none());
        Ok(())
    }

    #[test]
    fn seed_request_accepts_camel_case() -> Result<()> {
        let request: SeedRequest = serde_json::from_value(serde_json::json!({
            "username": "root",
            "password": "a-strong-password",
            "displayName": "Root",
        }))?;
        assert_eq!(request.display_name, "Root");
        Ok(())
    }
}
