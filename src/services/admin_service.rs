// src/services/admin_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReportRepository, ShopRepository, UserRepository},
    models::{
        auth::{User, UserFilter, UsersQuery},
        pagination::{PageInfo, PageRequest, ADMIN_PAGE_LIMIT},
        report::{DashboardStats, ReportFilter, ReportStatus},
        shop::ShopFilter,
    },
};

// Account administration and the dashboard counters.
// Shop moderation lives in ShopService, report review in ReportService.
#[derive(Clone)]
pub struct AdminService {
    user_repo: UserRepository,
    shop_repo: ShopRepository,
    report_repo: ReportRepository,
}

impl AdminService {
    pub fn new(
        user_repo: UserRepository,
        shop_repo: ShopRepository,
        report_repo: ReportRepository,
    ) -> Self {
        Self { user_repo, shop_repo, report_repo }
    }

    pub async fn list_users(&self, query: &UsersQuery) -> Result<(Vec<User>, PageInfo), AppError> {
        let page = PageRequest::from_query(query.page, query.limit, ADMIN_PAGE_LIMIT)?;
        let filter = UserFilter::from(query);

        let users = self.user_repo.list_users(&filter, &page).await?;
        let total = self.user_repo.count_users(&filter).await?;

        let pagination = PageInfo::new(&page, users.len(), total.max(0) as u64);
        Ok((users, pagination))
    }

    pub async fn toggle_user_status(&self, actor: &User, id: Uuid) -> Result<User, AppError> {
        if actor.id == id {
            return Err(AppError::Forbidden("You cannot change the status of your own account".into()));
        }

        let user = self.user_repo.toggle_active(id).await?.ok_or(AppError::UserNotFound)?;
        tracing::info!(user_id = %user.id, is_active = user.is_active, actor_id = %actor.id, "account status toggled");
        Ok(user)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let approved = ShopFilter { is_approved: Some(true), ..ShopFilter::default() };
        let pending = ShopFilter { is_approved: Some(false), ..ShopFilter::default() };
        let pending_reports = ReportFilter { status: Some(ReportStatus::Pending), reason: None };
        let all_shops = ShopFilter::default();
        let all_users = UserFilter::default();
        let all_reports = ReportFilter::default();

        let (total_shops, approved_shops, pending_shops, total_users, total_reports, pending_reports) = tokio::try_join!(
            self.shop_repo.count(&all_shops),
            self.shop_repo.count(&approved),
            self.shop_repo.count(&pending),
            self.user_repo.count_users(&all_users),
            self.report_repo.count(&all_reports),
            self.report_repo.count(&pending_reports),
        )?;

        Ok(DashboardStats {
            total_shops,
            approved_shops,
            pending_shops,
            total_users,
            total_reports,
            pending_reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{tests::user, Role};
    use sqlx::{postgres::PgPoolOptions, PgPool};

    fn service(pool: PgPool) -> AdminService {
        AdminService::new(
            UserRepository::new(pool.clone()),
            ShopRepository::new(pool.clone()),
            ReportRepository::new(pool),
        )
    }

    #[tokio::test]
    async fn admin_cannot_toggle_own_account() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nightmate@localhost/nightmate")
            .unwrap();
        let admin = user(Role::Admin);

        let err = service(pool).toggle_user_status(&admin, admin.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn dashboard_counts_on_empty_database(pool: PgPool) {
        let stats = service(pool).dashboard_stats().await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_shops: 0,
                approved_shops: 0,
                pending_shops: 0,
                total_users: 0,
                total_reports: 0,
                pending_reports: 0,
            }
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn users_can_be_filtered_by_role(pool: PgPool) {
        let repo = UserRepository::new(pool.clone());
        repo.create_user("Sarah", "sarah@nightmate.com", "hash", Role::User).await.unwrap();
        repo.create_user("John", "john@nightmate.com", "hash", Role::Poster).await.unwrap();

        let query = UsersQuery { role: Some(Role::Poster), ..Default::default() };
        let (users, pagination) = service(pool).list_users(&query).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "john@nightmate.com");
        assert_eq!(pagination.total, 1);
    }
}
