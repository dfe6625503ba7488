// src/handlers/admin.rs

// Every route here sits behind auth_guard and RequireRole<AdminOnly>.

use axum::{extract::State, response::IntoResponse, Json};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        extract::{AppPath, AppQuery},
        response::ApiResponse,
    },
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::{
        auth::{UserData, UserListData, UsersQuery},
        report::DashboardData,
        shop::{AdminShopsQuery, PagedShopListData, ShopStatusData},
    },
};

#[utoipa::path(
    get,
    path = "/api/admin/shops",
    tag = "Admin",
    params(AdminShopsQuery),
    responses(
        (status = 200, description = "All shops, newest first", body = PagedShopListData),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_shops(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    AppQuery(query): AppQuery<AdminShopsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (shops, pagination) = app_state.shop_service.list_shops(&query).await?;
    Ok(Json(ApiResponse::ok(PagedShopListData { shops, pagination })))
}

#[utoipa::path(
    put,
    path = "/api/admin/shops/{id}/toggle",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Shop id")),
    responses(
        (status = 200, description = "Shop active flag flipped", body = ShopStatusData),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Shop not found")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn toggle_shop(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let shop = app_state.shop_service.toggle_active(id).await?;

    let message = if shop.is_active { "Shop activated" } else { "Shop deactivated" };
    Ok(Json(ApiResponse::with_message(message, ShopStatusData { shop })))
}

#[utoipa::path(
    delete,
    path = "/api/admin/shops/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Shop id")),
    responses(
        (status = 200, description = "Shop and its reports deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Shop not found")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn delete_shop(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.shop_service.delete_shop(id).await?;
    Ok(Json(ApiResponse::message("Shop deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    params(UsersQuery),
    responses(
        (status = 200, description = "Accounts, newest first", body = UserListData),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    AppQuery(query): AppQuery<UsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (users, pagination) = app_state.admin_service.list_users(&query).await?;
    Ok(Json(ApiResponse::ok(UserListData { users, pagination })))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/toggle-status",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Account active flag flipped", body = UserData),
        (status = 403, description = "Admin access required, or own account"),
        (status = 404, description = "User not found")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn toggle_user_status(
    State(app_state): State<AppState>,
    RequireRole(admin, _): RequireRole<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.admin_service.toggle_user_status(&admin, id).await?;

    let message = if user.is_active { "User activated" } else { "User deactivated" };
    Ok(Json(ApiResponse::with_message(message, UserData { user })))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Directory counters", body = DashboardData),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.admin_service.dashboard_stats().await?;
    Ok(Json(ApiResponse::ok(DashboardData { stats })))
}
