// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{auth::UserSummary, pagination::PageInfo, shop::ShopCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    InaccurateHours,
    ShopClosed,
    WrongLocation,
    InappropriateContent,
    Spam,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::Pending,
        ReportStatus::Reviewed,
        ReportStatus::Resolved,
        ReportStatus::Dismissed,
    ];

    /// Statuses covered by the one-open-report rule.
    pub fn active() -> Vec<ReportStatus> {
        Self::ALL.into_iter().filter(|status| status.is_active()).collect()
    }

    /// Pending and reviewed reports block a new report on the same shop by the same reporter.
    pub fn is_active(self) -> bool {
        match self {
            ReportStatus::Pending | ReportStatus::Reviewed => true,
            ReportStatus::Resolved | ReportStatus::Dismissed => false,
        }
    }
}

// Plain row of the reports table
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: ReportReason,
    pub description: String,
    pub status: ReportStatus,
    pub admin_notes: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Report joined with the shop, the reporter and (when reviewed) the reviewer
#[derive(Debug, Clone, FromRow)]
pub struct ReportRecord {
    #[sqlx(flatten)]
    pub report: Report,
    pub shop_name: String,
    pub shop_category: ShopCategory,
    pub shop_address: String,
    pub shop_city: String,
    pub reporter_name: String,
    pub reporter_email: String,
    pub reviewer_name: Option<String>,
    pub reviewer_email: Option<String>,
}

impl ReportRecord {
    pub fn shop(&self) -> ReportedShop {
        ReportedShop {
            id: self.report.shop_id,
            name: self.shop_name.clone(),
            category: self.shop_category,
            address: self.shop_address.clone(),
            city: self.shop_city.clone(),
        }
    }

    pub fn reviewer(&self) -> Option<UserSummary> {
        match (self.report.reviewed_by, &self.reviewer_name, &self.reviewer_email) {
            (Some(id), Some(name), Some(email)) => Some(UserSummary {
                id,
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }

    pub fn to_admin_view(&self) -> ReportView {
        ReportView {
            id: self.report.id,
            shop: self.shop(),
            reporter: UserSummary {
                id: self.report.reporter_id,
                name: self.reporter_name.clone(),
                email: self.reporter_email.clone(),
            },
            reason: self.report.reason,
            description: self.report.description.clone(),
            status: self.report.status,
            admin_notes: self.report.admin_notes.clone(),
            reviewed_by: self.reviewer(),
            reviewed_at: self.report.reviewed_at,
            created_at: self.report.created_at,
        }
    }

    pub fn to_own_view(&self) -> MyReportView {
        MyReportView {
            id: self.report.id,
            shop: self.shop(),
            reason: self.report.reason,
            description: self.report.description.clone(),
            status: self.report.status,
            admin_notes: self.report.admin_notes.clone(),
            created_at: self.report.created_at,
        }
    }
}

// ---
// Response views
// ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportedShop {
    pub id: Uuid,
    pub name: String,
    pub category: ShopCategory,
    pub address: String,
    pub city: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: Uuid,
    pub shop: ReportedShop,
    pub reporter: UserSummary,
    pub reason: ReportReason,
    pub description: String,
    pub status: ReportStatus,
    pub admin_notes: String,
    pub reviewed_by: Option<UserSummary>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyReportView {
    pub id: Uuid,
    pub shop: ReportedShop,
    pub reason: ReportReason,
    pub description: String,
    pub status: ReportStatus,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReportView {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub reason: ReportReason,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Report> for CreatedReportView {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id,
            shop_id: report.shop_id,
            reason: report.reason,
            status: report.status,
            created_at: report.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedReportView {
    pub id: Uuid,
    pub status: ReportStatus,
    pub admin_notes: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<&Report> for ReviewedReportView {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id,
            status: report.status,
            admin_notes: report.admin_notes.clone(),
            reviewed_by: report.reviewed_by,
            reviewed_at: report.reviewed_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedReportData {
    pub report: CreatedReportView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewedReportData {
    pub report: ReviewedReportView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportListData {
    pub reports: Vec<ReportView>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MyReportListData {
    pub reports: Vec<MyReportView>,
}

// ---
// Payloads & filters
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportPayload {
    pub shop_id: Uuid,
    pub reason: ReportReason,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportStatusPayload {
    pub status: ReportStatus,

    #[validate(length(max = 1000, message = "Admin notes cannot exceed 1000 characters"))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportsQuery {
    pub status: Option<ReportStatus>,
    pub reason: Option<ReportReason>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Clone)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub reason: Option<ReportReason>,
}

// ---
// Admin dashboard
// ---

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_shops: i64,
    pub approved_shops: i64,
    pub pending_shops: i64,
    pub total_users: i64,
    pub total_reports: i64,
    pub pending_reports: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardData {
    pub stats: DashboardStats,
}
