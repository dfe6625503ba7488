// src/db/report_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        pagination::PageRequest,
        report::{Report, ReportFilter, ReportReason, ReportRecord, ReportStatus},
    },
};

const REPORT_COLUMNS: &str = "id, shop_id, reporter_id, reason, description, status, admin_notes, \
                              reviewed_by, reviewed_at, created_at, updated_at";

const REPORT_PROJECTION: &str = "SELECT r.id, r.shop_id, r.reporter_id, r.reason, r.description, \
     r.status, r.admin_notes, r.reviewed_by, r.reviewed_at, r.created_at, r.updated_at, \
     s.name AS shop_name, s.category AS shop_category, s.address AS shop_address, \
     s.city AS shop_city, \
     ru.name AS reporter_name, ru.email AS reporter_email, \
     rv.name AS reviewer_name, rv.email AS reviewer_email \
     FROM reports r \
     JOIN shops s ON s.id = r.shop_id \
     JOIN users ru ON ru.id = r.reporter_id \
     LEFT JOIN users rv ON rv.id = r.reviewed_by";

// Partial unique index: one pending/reviewed report per (shop, reporter)
const ACTIVE_REPORT_INDEX: &str = "idx_reports_one_active_per_reporter";

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active(
        &self,
        shop_id: Uuid,
        reporter_id: Uuid,
    ) -> Result<Option<Report>, AppError> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports \
             WHERE shop_id = $1 AND reporter_id = $2 AND status = ANY($3) \
             LIMIT 1"
        );
        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(shop_id)
            .bind(reporter_id)
            .bind(ReportStatus::active())
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    pub async fn create(
        &self,
        shop_id: Uuid,
        reporter_id: Uuid,
        reason: ReportReason,
        description: &str,
    ) -> Result<Report, AppError> {
        let sql = format!(
            "INSERT INTO reports (shop_id, reporter_id, reason, description) \
             VALUES ($1, $2, $3, $4) RETURNING {REPORT_COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&sql)
            .bind(shop_id)
            .bind(reporter_id)
            .bind(reason)
            .bind(description)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    pub async fn list(
        &self,
        filter: &ReportFilter,
        page: &PageRequest,
    ) -> Result<Vec<ReportRecord>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(REPORT_PROJECTION);
        push_report_filter(&mut qb, filter);
        qb.push(" ORDER BY r.created_at DESC, r.id LIMIT ")
            .push_bind(page.sql_limit())
            .push(" OFFSET ")
            .push_bind(page.sql_offset());

        let reports = qb.build_query_as::<ReportRecord>().fetch_all(&self.pool).await?;
        Ok(reports)
    }

    pub async fn count(&self, filter: &ReportFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reports r");
        push_report_filter(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn list_by_reporter(&self, reporter_id: Uuid) -> Result<Vec<ReportRecord>, AppError> {
        let sql = format!("{REPORT_PROJECTION} WHERE r.reporter_id = $1 ORDER BY r.created_at DESC, r.id");
        let reports = sqlx::query_as::<_, ReportRecord>(&sql)
            .bind(reporter_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reports)
    }

    /// Sets the status and stamps the reviewer and review time.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ReportStatus,
        admin_notes: &str,
        reviewer_id: Uuid,
    ) -> Result<Option<Report>, AppError> {
        let sql = format!(
            "UPDATE reports SET status = $2, admin_notes = $3, reviewed_by = $4, \
             reviewed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING {REPORT_COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(status)
            .bind(admin_notes)
            .bind(reviewer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    pub async fn delete_by_shop<'e, E>(&self, executor: E, shop_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM reports WHERE shop_id = $1")
            .bind(shop_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(ACTIVE_REPORT_INDEX) {
            return AppError::DuplicateReport;
        }
        // The shop vanished between the existence check and the insert
        if db_err.is_foreign_key_violation() && db_err.constraint() == Some("reports_shop_id_fkey") {
            return AppError::ShopNotFound;
        }
    }
    e.into()
}

fn push_report_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND r.status = ").push_bind(status);
    }
    if let Some(reason) = filter.reason {
        qb.push(" AND r.reason = ").push_bind(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_filter_sql() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reports r");
        push_report_filter(
            &mut qb,
            &ReportFilter { status: Some(ReportStatus::Pending), reason: Some(ReportReason::Spam) },
        );
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM reports r WHERE TRUE AND r.status = $1 AND r.reason = $2"
        );
    }
}
