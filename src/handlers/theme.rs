// src/handlers/theme.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::AppJson, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::theme::{
        ClientInfo, GuestLookupPayload, GuestThemeData, GuestThemePayload, ThemeData, ThemePayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/theme/preference",
    tag = "Theme",
    responses(
        (status = 200, description = "Theme stored on the account", body = ThemeData),
        (status = 401, description = "Not authenticated")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_preference(AuthenticatedUser(user): AuthenticatedUser) -> impl IntoResponse {
    Json(ApiResponse::ok(ThemeData { theme_preference: user.theme_preference }))
}

#[utoipa::path(
    put,
    path = "/api/theme/preference",
    tag = "Theme",
    request_body = ThemePayload,
    responses(
        (status = 200, description = "Theme updated", body = ThemeData),
        (status = 400, description = "Unknown theme"),
        (status = 401, description = "Not authenticated")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_preference(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<ThemePayload>,
) -> Result<impl IntoResponse, AppError> {
    let theme_preference = app_state
        .theme_service
        .set_user_theme(&user, payload.theme_preference)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Theme preference updated successfully",
        ThemeData { theme_preference },
    )))
}

#[utoipa::path(
    post,
    path = "/api/theme/guest-preference",
    tag = "Theme",
    request_body = GuestLookupPayload,
    responses(
        (status = 200, description = "Guest theme, dark when the session is unknown or expired", body = GuestThemeData),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn get_guest_preference(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<GuestLookupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let data = app_state
        .theme_service
        .guest_theme(payload.session_id())
        .await?;

    Ok(Json(ApiResponse::ok(data)))
}

#[utoipa::path(
    put,
    path = "/api/theme/guest-preference",
    tag = "Theme",
    request_body = GuestThemePayload,
    responses(
        (status = 200, description = "Guest theme saved for 30 days", body = GuestThemeData),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn update_guest_preference(
    State(app_state): State<AppState>,
    client: ClientInfo,
    AppJson(payload): AppJson<GuestThemePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let data = app_state
        .theme_service
        .save_guest_theme(payload.session_id(), payload.theme_preference, &client)
        .await?;

    Ok(Json(ApiResponse::with_message("Guest theme preference saved", data)))
}
