// src/common/error.rs

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

// Single error type for the whole API; every handler returns Result<_, AppError>.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(#[from] PathRejection),

    #[error("Invalid query string: {0}")]
    InvalidQueryString(#[from] QueryRejection),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Account is deactivated")]
    AccountDisabled,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Shop not found")]
    ShopNotFound,

    #[error("Report not found")]
    ReportNotFound,

    #[error("Duplicate active report")]
    DuplicateReport,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// One entry per offending field, e.g. { "field": "location.coordinates.lat", ... }
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidBody(_)
            | AppError::InvalidPath(_)
            | AppError::InvalidQueryString(_)
            | AppError::InvalidQuery(_)
            | AppError::DuplicateReport => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::AccountDisabled | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::ShopNotFound | AppError::ReportNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Message shown to the client. Internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(_) => "Validation failed".into(),
            AppError::InvalidBody(rejection) => rejection.body_text(),
            AppError::InvalidPath(rejection) => rejection.body_text(),
            AppError::InvalidQueryString(rejection) => rejection.body_text(),
            AppError::InvalidQuery(message) => message.clone(),
            AppError::EmailAlreadyExists => "An account with this email already exists".into(),
            AppError::InvalidCredentials => "Invalid email or password".into(),
            AppError::InvalidToken => "Not authorized, token missing or invalid".into(),
            AppError::AccountDisabled => "Account has been deactivated".into(),
            AppError::Forbidden(message) => message.clone(),
            AppError::UserNotFound => "User not found".into(),
            AppError::ShopNotFound => "Shop not found".into(),
            AppError::ReportNotFound => "Report not found".into(),
            AppError::DuplicateReport => "You have already reported this shop".into(),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "An unexpected error occurred".into(),
        }
    }
}

/// Flattens nested validator output into dotted field paths, sorted by path.
pub fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    push_field_errors("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn push_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push(FieldError { field: path.clone(), message });
                }
            }
            ValidationErrorsKind::Struct(inner) => push_field_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    push_field_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::ValidationError(errors) = &self {
            let body = Json(json!({
                "success": false,
                "message": "Validation failed",
                "errors": collect_field_errors(errors),
            }));
            return (status, body).into_response();
        }

        if status.is_server_error() {
            tracing::error!("Internal server error: {}", self);
        }

        let body = Json(json!({ "success": false, "message": self.public_message() }));
        (status, body).into_response()
    }
}
