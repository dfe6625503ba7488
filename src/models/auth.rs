// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{pagination::PageInfo, theme::Theme};

// Maps the user_role enum in Postgres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Poster,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        match self {
            Role::Admin => true,
            Role::User | Role::Poster => false,
        }
    }

    pub fn can_publish_shops(self) -> bool {
        match self {
            Role::Poster | Role::Admin => true,
            Role::User => false,
        }
    }
}

// A user as it comes out of the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "Sarah User")]
    pub name: String,
    #[schema(example = "sarah@nightmate.com")]
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,
    pub is_active: bool,
    pub theme_preference: Theme,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Embedded owner/reporter/reviewer reference, e.g. { id, name, email }
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

fn validate_signup_role(role: &Role) -> Result<(), ValidationError> {
    match role {
        Role::User | Role::Poster => Ok(()),
        Role::Admin => Err(ValidationError::new("role")
            .with_message("Role must be user or poster".into())),
    }
}

// Names are stored trimmed, so the bounds apply to the trimmed value
fn validate_person_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if !(2..=50).contains(&len) {
        return Err(ValidationError::new("length")
            .with_message("Name must be between 2 and 50 characters".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(custom(function = "validate_person_name"))]
    #[schema(example = "John Poster")]
    pub name: String,

    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "john@nightmate.com")]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    #[validate(custom(function = "validate_signup_role"))]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(custom(function = "validate_person_name"))]
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserData {
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListData {
    pub users: Vec<User>,
    pub pagination: PageInfo,
}

// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

// ---
// Admin listing of accounts
// ---

#[derive(Debug, Clone, Copy, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatusFilter {
    Active,
    Inactive,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsersQuery {
    pub role: Option<Role>,
    pub status: Option<AccountStatusFilter>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// Storage-level filter built from UsersQuery
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl From<&UsersQuery> for UserFilter {
    fn from(query: &UsersQuery) -> Self {
        Self {
            role: query.role,
            is_active: query.status.map(|status| status == AccountStatusFilter::Active),
        }
    }
}
