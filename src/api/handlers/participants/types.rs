//! Request/response types for marathon registration.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::handlers::{Pagination, strip_tags};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub phone_number: String,
    pub residence: String,
    pub health_condition: String,
    pub sport_level: String,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationAccepted {
    pub id: Uuid,
    pub name: String,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub residence: String,
    pub health_condition: String,
    pub sport_level: String,
    pub created_at: DateTime<Utc>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ParticipantList {
    pub data: Vec<ParticipantRecord>,
    pub pagination: Pagination,
}

/// Per-field validation failure, mirrored back to the form.
#[derive(ToSchema, Serialize, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Registration fields after trimming and tag stripping.
#[derive(Debug)]
pub(super) struct SanitizedRegistration {
    pub(super) name: String,
    pub(super) phone_number: String,
    pub(super) residence: String,
    pub(super) health_condition: String,
    pub(super) sport_level: String,
}

impl RegistrationRequest {
    /// Trim, strip markup, and validate field bounds. Collects every
    /// failing field rather than stopping at the first.
    pub(super) fn sanitize(&self) -> Result<SanitizedRegistration, Vec<FieldError>> {
        let sanitized = SanitizedRegistration {
            name: strip_tags(&self.name),
            phone_number: strip_tags(&self.phone_number),
            residence: strip_tags(&self.residence),
            health_condition: strip_tags(&self.health_condition),
            sport_level: strip_tags(&self.sport_level),
        };

        let mut errors = Vec::new();
        if !(3..=255).contains(&sanitized.name.chars().count()) {
            errors.push(FieldError {
                field: "name",
                message: "Name must be 3-255 characters",
            });
        }
        if !(10..=20).contains(&sanitized.phone_number.chars().count())
            || !valid_phone(&sanitized.phone_number)
        {
            errors.push(FieldError {
                field: "phoneNumber",
                message: "Phone number must be 10-20 digits",
            });
        }
        if !(2..=255).contains(&sanitized.residence.chars().count()) {
            errors.push(FieldError {
                field: "residence",
                message: "Residence must be 2-255 characters",
            });
        }
        if !(2..=255).contains(&sanitized.health_condition.chars().count()) {
            errors.push(FieldError {
                field: "healthCondition",
                message: "Health condition must be 2-255 characters",
            });
        }
        if !(2..=100).contains(&sanitized.sport_level.chars().count()) {
            errors.push(FieldError {
                field: "sportLevel",
                message: "Sport level must be 2-100 characters",
            });
        }

        if errors.is_empty() {
            Ok(sanitized)
        } else {
            Err(errors)
        }
    }
}

fn valid_phone(phone: &str) -> bool {
    Regex::new(r"^[\d\s\-\+\(\)]+$").is_ok_and(|re| re.is_match(phone))
}
