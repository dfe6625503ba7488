// src/models/theme.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "theme_preference", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

// Guests keep their theme for this long after the last write
pub const GUEST_PREFERENCE_TTL_DAYS: i64 = 30;

// Stored preference of an unauthenticated visitor (user_preferences table)
#[derive(Debug, Clone, FromRow)]
pub struct GuestPreference {
    pub id: Uuid,
    pub session_id: String,
    pub theme_preference: Theme,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub last_accessed: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThemePayload {
    pub theme_preference: Theme,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestLookupPayload {
    #[validate(length(max = 128, message = "Session ID cannot exceed 128 characters"))]
    pub session_id: Option<String>,
}

impl GuestLookupPayload {
    pub fn session_id(&self) -> Option<&str> {
        present(self.session_id.as_deref())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestThemePayload {
    pub theme_preference: Theme,

    #[validate(length(max = 128, message = "Session ID cannot exceed 128 characters"))]
    pub session_id: Option<String>,
}

impl GuestThemePayload {
    pub fn session_id(&self) -> Option<&str> {
        present(self.session_id.as_deref())
    }
}

// A blank session id counts as no session id
fn present(session_id: Option<&str>) -> Option<&str> {
    session_id.map(str::trim).filter(|id| !id.is_empty())
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeData {
    pub theme_preference: Theme,
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GuestThemeData {
    pub session_id: String,
    pub theme_preference: Theme,
}

// Where a guest write came from
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
