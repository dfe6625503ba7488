// src/handlers/shops.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath, AppQuery},
        response::ApiResponse,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PosterOrAdmin, RequireRole},
    },
    models::shop::{OpenShopsData, OpenShopsQuery, ShopData, ShopListData, ShopPayload},
};

#[utoipa::path(
    post,
    path = "/api/shops",
    tag = "Shops",
    request_body = ShopPayload,
    responses(
        (status = 201, description = "Shop created, approved and active", body = ShopData),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Only posters and admins can create shops")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn create_shop(
    State(app_state): State<AppState>,
    RequireRole(owner, _): RequireRole<PosterOrAdmin>,
    AppJson(payload): AppJson<ShopPayload>,
) -> Result<impl IntoResponse, AppError> {
    let shop = app_state.shop_service.create_shop(&owner, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Shop created successfully", ShopData { shop })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/shops/open-now",
    tag = "Shops",
    params(OpenShopsQuery),
    responses(
        (status = 200, description = "Approved, active shops open at this moment", body = OpenShopsData),
        (status = 400, description = "Invalid query parameter")
    )
)]
pub async fn list_open_shops(
    State(app_state): State<AppState>,
    AppQuery(query): AppQuery<OpenShopsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.shop_service.list_open_shops(&query).await?;

    Ok(Json(ApiResponse::ok(OpenShopsData {
        shops: page.shops,
        pagination: page.pagination,
    })))
}

#[utoipa::path(
    get,
    path = "/api/shops/my-shops",
    tag = "Shops",
    responses(
        (status = 200, description = "Shops owned by the caller, newest first", body = ShopListData),
        (status = 401, description = "Not authenticated")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_my_shops(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let shops = app_state.shop_service.list_my_shops(&user).await?;
    Ok(Json(ApiResponse::ok(ShopListData { shops })))
}

#[utoipa::path(
    get,
    path = "/api/shops/{id}",
    tag = "Shops",
    params(("id" = Uuid, Path, description = "Shop id")),
    responses(
        (status = 200, description = "Shop details", body = ShopData),
        (status = 404, description = "Shop not found")
    )
)]
pub async fn get_shop(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let shop = app_state.shop_service.get_shop(id).await?;
    Ok(Json(ApiResponse::ok(ShopData { shop })))
}

#[utoipa::path(
    put,
    path = "/api/shops/{id}",
    tag = "Shops",
    params(("id" = Uuid, Path, description = "Shop id")),
    request_body = ShopPayload,
    responses(
        (status = 200, description = "Shop updated", body = ShopData),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Shop not found")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_shop(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ShopPayload>,
) -> Result<impl IntoResponse, AppError> {
    let shop = app_state.shop_service.update_shop(&user, id, payload).await?;
    Ok(Json(ApiResponse::with_message("Shop updated successfully", ShopData { shop })))
}
