// src/services/report_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReportRepository, ShopRepository},
    models::{
        auth::User,
        pagination::{PageInfo, PageRequest, ADMIN_PAGE_LIMIT},
        report::{
            CreateReportPayload, MyReportView, Report, ReportFilter, ReportView, ReportsQuery,
            UpdateReportStatusPayload,
        },
    },
};

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    shop_repo: ShopRepository,
}

impl ReportService {
    pub fn new(report_repo: ReportRepository, shop_repo: ShopRepository) -> Self {
        Self { report_repo, shop_repo }
    }

    /// Files a report. A reporter may hold only one pending/reviewed report per shop.
    pub async fn create_report(
        &self,
        reporter: &User,
        payload: CreateReportPayload,
    ) -> Result<Report, AppError> {
        // 1. The shop must exist
        if self.shop_repo.find_by_id(payload.shop_id).await?.is_none() {
            return Err(AppError::ShopNotFound);
        }

        // 2. Friendly duplicate check; the partial unique index closes the race
        if self.report_repo.find_active(payload.shop_id, reporter.id).await?.is_some() {
            return Err(AppError::DuplicateReport);
        }

        // 3. Insert
        let description = payload.description.unwrap_or_default();
        let report = self
            .report_repo
            .create(payload.shop_id, reporter.id, payload.reason, description.trim())
            .await?;

        tracing::info!(
            report_id = %report.id,
            shop_id = %report.shop_id,
            reason = ?report.reason,
            "report submitted"
        );
        Ok(report)
    }

    pub async fn list_my_reports(&self, reporter: &User) -> Result<Vec<MyReportView>, AppError> {
        let reports = self.report_repo.list_by_reporter(reporter.id).await?;
        Ok(reports.iter().map(|r| r.to_own_view()).collect())
    }

    pub async fn list_reports(
        &self,
        query: &ReportsQuery,
    ) -> Result<(Vec<ReportView>, PageInfo), AppError> {
        let page = PageRequest::from_query(query.page, query.limit, ADMIN_PAGE_LIMIT)?;
        let filter = ReportFilter { status: query.status, reason: query.reason };

        let reports = self.report_repo.list(&filter, &page).await?;
        let total = self.report_repo.count(&filter).await?;

        let pagination = PageInfo::new(&page, reports.len(), total.max(0) as u64);
        Ok((reports.iter().map(|r| r.to_admin_view()).collect(), pagination))
    }

    /// Records the admin's decision along with who made it and when.
    pub async fn update_status(
        &self,
        reviewer: &User,
        id: Uuid,
        payload: UpdateReportStatusPayload,
    ) -> Result<Report, AppError> {
        let notes = payload.admin_notes.unwrap_or_default();
        let report = self
            .report_repo
            .update_status(id, payload.status, notes.trim(), reviewer.id)
            .await?
            .ok_or(AppError::ReportNotFound)?;

        tracing::info!(
            report_id = %report.id,
            status = ?report.status,
            reviewer_id = %reviewer.id,
            "report reviewed"
        );
        Ok(report)
    }
}
