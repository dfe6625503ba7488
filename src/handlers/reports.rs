// src/handlers/reports.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath, AppQuery},
        response::ApiResponse,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole},
    },
    models::report::{
        CreateReportPayload, CreatedReportData, MyReportListData, ReportListData, ReportsQuery,
        ReviewedReportData, UpdateReportStatusPayload,
    },
};

#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "Reports",
    request_body = CreateReportPayload,
    responses(
        (status = 201, description = "Report submitted", body = CreatedReportData),
        (status = 400, description = "Validation failed or an active report already exists"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Shop not found")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn create_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let report = app_state.report_service.create_report(&user, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Report submitted successfully",
            CreatedReportData { report: (&report).into() },
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/reports/my-reports",
    tag = "Reports",
    responses(
        (status = 200, description = "Reports filed by the caller", body = MyReportListData),
        (status = 401, description = "Not authenticated")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_my_reports(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let reports = app_state.report_service.list_my_reports(&user).await?;
    Ok(Json(ApiResponse::ok(MyReportListData { reports })))
}

#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "Reports",
    params(ReportsQuery),
    responses(
        (status = 200, description = "All reports, newest first", body = ReportListData),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_reports(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    AppQuery(query): AppQuery<ReportsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (reports, pagination) = app_state.report_service.list_reports(&query).await?;
    Ok(Json(ApiResponse::ok(ReportListData { reports, pagination })))
}

#[utoipa::path(
    put,
    path = "/api/reports/{id}/status",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = UpdateReportStatusPayload,
    responses(
        (status = 200, description = "Report status updated", body = ReviewedReportData),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Report not found")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_report_status(
    State(app_state): State<AppState>,
    RequireRole(admin, _): RequireRole<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateReportStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let report = app_state.report_service.update_status(&admin, id, payload).await?;

    Ok(Json(ApiResponse::with_message(
        "Report status updated successfully",
        ReviewedReportData { report: (&report).into() },
    )))
}
