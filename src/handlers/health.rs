// src/handlers/health.rs

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is up", body = HealthStatus)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        success: true,
        message: "NightMate API is running".into(),
        timestamp: Utc::now(),
        environment: app_state.config.app_env.clone(),
    })
}

/// JSON 404 for unknown `/api` routes.
pub async fn route_not_found() -> impl IntoResponse {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "success": false, "message": "Route not found" })),
    )
}
