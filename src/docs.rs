// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NightMate API",
        description = "Directory of late-night shops with live open/closed status"
    ),
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::update_profile,

        // --- Shops ---
        handlers::shops::create_shop,
        handlers::shops::list_open_shops,
        handlers::shops::list_my_shops,
        handlers::shops::get_shop,
        handlers::shops::update_shop,

        // --- Reports ---
        handlers::reports::create_report,
        handlers::reports::list_my_reports,
        handlers::reports::list_reports,
        handlers::reports::update_report_status,

        // --- Admin ---
        handlers::admin::list_shops,
        handlers::admin::toggle_shop,
        handlers::admin::delete_shop,
        handlers::admin::list_users,
        handlers::admin::toggle_user_status,
        handlers::admin::dashboard,

        // --- Theme ---
        handlers::theme::get_preference,
        handlers::theme::update_preference,
        handlers::theme::get_guest_preference,
        handlers::theme::update_guest_preference,
    ),
    components(
        schemas(
            handlers::health::HealthStatus,

            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::UserSummary,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,
            models::auth::UserData,
            models::auth::UserListData,
            models::auth::AccountStatusFilter,

            // --- Pagination ---
            models::pagination::PageInfo,

            // --- Shops ---
            models::shop::ShopCategory,
            models::shop::Coordinates,
            models::shop::Location,
            models::shop::OpenShopView,
            models::shop::ShopView,
            models::shop::ShopStatusView,
            models::shop::ShopData,
            models::shop::ShopStatusData,
            models::shop::ShopListData,
            models::shop::PagedShopListData,
            models::shop::OpenShopsData,
            models::shop::CoordinatesPayload,
            models::shop::LocationPayload,
            models::shop::ShopPayload,
            models::shop::ShopStatusFilter,

            // --- Reports ---
            models::report::ReportReason,
            models::report::ReportStatus,
            models::report::ReportedShop,
            models::report::ReportView,
            models::report::MyReportView,
            models::report::CreatedReportView,
            models::report::ReviewedReportView,
            models::report::CreatedReportData,
            models::report::ReviewedReportData,
            models::report::ReportListData,
            models::report::MyReportListData,
            models::report::CreateReportPayload,
            models::report::UpdateReportStatusPayload,
            models::report::DashboardStats,
            models::report::DashboardData,

            // --- Theme ---
            models::theme::Theme,
            models::theme::ThemePayload,
            models::theme::ThemeData,
            models::theme::GuestLookupPayload,
            models::theme::GuestThemePayload,
            models::theme::GuestThemeData,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Signup, login and profile"),
        (name = "Shops", description = "Shop directory and listings management"),
        (name = "Reports", description = "User reports about listings"),
        (name = "Admin", description = "Moderation and dashboard"),
        (name = "Theme", description = "Dark/light preference for accounts and guests")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
