//! User domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Role;
use crate::config::DELETED_KEY_SEPARATOR;
use crate::errors::{AppError, AppResult};

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

/// Gender of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

impl From<&str> for Gender {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("FEMALE") {
            Gender::Female
        } else {
            Gender::Male
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: String,
    pub enabled: bool,
    pub is_deleted: bool,
    pub role: Role,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Username this record carries once soft-deleted: `<original>-<id>`.
    pub fn tombstone_username(&self) -> String {
        format!("{}{}{}", self.username, DELETED_KEY_SEPARATOR, self.id)
    }

    /// Soft delete the user, freeing the original username for reuse.
    pub fn soft_delete(&mut self) {
        self.username = self.tombstone_username();
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }

    /// Overwrite profile fields from an update request.
    pub fn apply(&mut self, changes: &UserChanges) {
        self.first_name = changes.first_name.clone();
        self.last_name = changes.last_name.clone();
        self.phone = changes.phone.clone();
        self.role = changes.role.clone();
        self.gender = changes.gender;
        if let Some(enabled) = changes.enabled {
            self.enabled = enabled;
        }
        self.updated_at = Utc::now();
    }
}

/// Validate a ten digit phone number.
pub fn validate_phone(phone: &str) -> AppResult<()> {
    if PHONE_PATTERN.is_match(phone) {
        Ok(())
    } else {
        Err(AppError::validation("Phone number must be 10 digits"))
    }
}

/// Data for a user to be created. The password is plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub phone: String,
    pub role: Role,
    pub gender: Gender,
}

/// Full replacement of a user's profile, keyed by username.
///
/// `password` is `None` when the credential is left unchanged.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: Option<String>,
    pub phone: String,
    pub role: Role,
    pub gender: Gender,
    pub enabled: Option<bool>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 2)]
    pub id: i64,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@manager.com")]
    pub user_name: String,
    #[schema(example = "5551234567")]
    pub phone: String,
    pub enabled: bool,
    #[schema(example = "Manager")]
    pub role: String,
    pub gender: Gender,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            user_name: user.username,
            phone: user.phone,
            enabled: user.enabled,
            role: user.role.to_string(),
            gender: user.gender,
        }
    }
}
