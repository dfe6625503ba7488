// src/services/shop_service.rs

use chrono::{FixedOffset, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReportRepository, ShopRepository},
    models::{
        auth::{Role, User},
        pagination::{PageInfo, PageRequest, ADMIN_PAGE_LIMIT, PUBLIC_PAGE_LIMIT},
        shop::{
            AdminShopsQuery, OpenShopView, OpenShopsQuery, ShopFields, ShopFilter, ShopPayload,
            ShopRecord, ShopStatusView, ShopView,
        },
    },
    services::open_window::wall_clock_time,
};

/// One page of the public "open now" directory.
#[derive(Debug)]
pub struct OpenShopsPage {
    pub shops: Vec<OpenShopView>,
    /// Shops that passed the storage filters, before the open-window check.
    pub matched_before_time_filter: u64,
    pub pagination: PageInfo,
}

#[derive(Clone)]
pub struct ShopService {
    pool: PgPool,
    shop_repo: ShopRepository,
    report_repo: ReportRepository,
    utc_offset: Option<FixedOffset>,
}

impl ShopService {
    pub fn new(
        pool: PgPool,
        shop_repo: ShopRepository,
        report_repo: ReportRepository,
        utc_offset: Option<FixedOffset>,
    ) -> Self {
        Self { pool, shop_repo, report_repo, utc_offset }
    }

    /// Time of day used for every open/closed decision of a request.
    pub fn now(&self) -> NaiveTime {
        wall_clock_time(self.utc_offset)
    }

    pub async fn create_shop(&self, owner: &User, payload: ShopPayload) -> Result<ShopView, AppError> {
        let fields = ShopFields::try_from(payload)?;
        let shop = self.shop_repo.create(owner.id, &fields).await?;

        tracing::info!(shop_id = %shop.id, owner_id = %owner.id, "shop created");
        Ok(shop.to_view(self.now()))
    }

    pub async fn get_shop(&self, id: Uuid) -> Result<ShopView, AppError> {
        let shop = self.find(id).await?;
        Ok(shop.to_view(self.now()))
    }

    pub async fn update_shop(
        &self,
        actor: &User,
        id: Uuid,
        payload: ShopPayload,
    ) -> Result<ShopView, AppError> {
        let fields = ShopFields::try_from(payload)?;

        let existing = self.find(id).await?;
        ensure_can_manage(actor, existing.owner_id)?;

        let shop = self.shop_repo.update(id, &fields).await?.ok_or(AppError::ShopNotFound)?;
        tracing::info!(shop_id = %shop.id, actor_id = %actor.id, "shop updated");
        Ok(shop.to_view(self.now()))
    }

    pub async fn list_my_shops(&self, owner: &User) -> Result<Vec<ShopView>, AppError> {
        let now = self.now();
        let shops = self.shop_repo.list_by_owner(owner.id).await?;
        Ok(shops.iter().map(|shop| shop.to_view(now)).collect())
    }

    /// Public directory: storage filters and the open-window check both run
    /// in the query, so pages and totals only count shops open right now.
    pub async fn list_open_shops(&self, query: &OpenShopsQuery) -> Result<OpenShopsPage, AppError> {
        let page = PageRequest::from_query(query.page, query.limit, PUBLIC_PAGE_LIMIT)?;
        let visible = ShopFilter::public(query.category, query.city.as_deref());
        let open = visible.clone().only_open_at(self.now());

        let (shops, total, matched) = tokio::try_join!(
            self.shop_repo.list(&open, &page),
            self.shop_repo.count(&open),
            self.shop_repo.count(&visible),
        )?;

        let pagination = PageInfo::new(&page, shops.len(), total.max(0) as u64);
        let result = OpenShopsPage {
            shops: shops.iter().map(ShopRecord::to_open_view).collect(),
            matched_before_time_filter: matched.max(0) as u64,
            pagination,
        };

        tracing::debug!(
            matched = result.matched_before_time_filter,
            returned = result.shops.len(),
            page = page.page,
            "open shops listed"
        );
        Ok(result)
    }

    pub async fn list_shops(
        &self,
        query: &AdminShopsQuery,
    ) -> Result<(Vec<ShopView>, PageInfo), AppError> {
        let page = PageRequest::from_query(query.page, query.limit, ADMIN_PAGE_LIMIT)?;
        let filter = ShopFilter::admin(query.status, query.category);

        let shops = self.shop_repo.list(&filter, &page).await?;
        let total = self.shop_repo.count(&filter).await?;

        let now = self.now();
        let pagination = PageInfo::new(&page, shops.len(), total.max(0) as u64);
        Ok((shops.iter().map(|shop| shop.to_view(now)).collect(), pagination))
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<ShopStatusView, AppError> {
        let shop = self.shop_repo.toggle_active(id).await?.ok_or(AppError::ShopNotFound)?;
        tracing::info!(shop_id = %shop.id, is_active = shop.is_active, "shop visibility toggled");
        Ok(shop.to_status_view())
    }

    /// Removes the shop and every report filed against it, atomically.
    pub async fn delete_shop(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Holding the row lock makes concurrent report inserts wait, then fail the FK check
        if !self.shop_repo.lock(&mut *tx, id).await? {
            return Err(AppError::ShopNotFound);
        }

        let reports_deleted = self.report_repo.delete_by_shop(&mut *tx, id).await?;
        let shops_deleted = self.shop_repo.delete(&mut *tx, id).await?;

        if shops_deleted == 0 {
            // Dropping the transaction rolls the report deletion back
            return Err(AppError::ShopNotFound);
        }

        tx.commit().await?;

        tracing::info!(shop_id = %id, reports_deleted, "shop deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<ShopRecord, AppError> {
        self.shop_repo.find_by_id(id).await?.ok_or(AppError::ShopNotFound)
    }
}

/// Owners manage their own shops, admins manage every shop.
pub fn ensure_can_manage(actor: &User, owner_id: Uuid) -> Result<(), AppError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Poster | Role::User if actor.id == owner_id => Ok(()),
        Role::Poster | Role::User => {
            Err(AppError::Forbidden("Not authorized to update this shop".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::UserRepository,
        models::auth::tests::user,
        services::open_window::{is_open_now, parse_clock_time},
    };

    fn at(value: &str) -> NaiveTime {
        parse_clock_time(value).unwrap()
    }

    #[test]
    fn owner_and_admin_can_manage_others_cannot() {
        let owner = user(Role::Poster);
        let other = user(Role::Poster);
        let admin = user(Role::Admin);

        assert!(ensure_can_manage(&owner, owner.id).is_ok());
        assert!(ensure_can_manage(&admin, owner.id).is_ok());
        assert!(matches!(ensure_can_manage(&other, owner.id), Err(AppError::Forbidden(_))));
        assert!(matches!(
            ensure_can_manage(&user(Role::User), owner.id),
            Err(AppError::Forbidden(_))
        ));
    }

    fn shop_payload(name: &str, open: &str, close: &str) -> ShopPayload {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "category": "food",
            "location": {
                "address": "123 Main Street",
                "city": "New York",
                "coordinates": { "lat": 40.7128, "lng": -74.006 }
            },
            "openTime": open,
            "closeTime": close
        }))
        .unwrap()
    }

    async fn seeded(pool: &PgPool) -> (ShopService, User) {
        let users = UserRepository::new(pool.clone());
        let owner = users
            .create_user("John Poster", "john@nightmate.com", "hash", Role::Poster)
            .await
            .unwrap();
        let service = ShopService::new(
            pool.clone(),
            ShopRepository::new(pool.clone()),
            ReportRepository::new(pool.clone()),
            None,
        );
        (service, owner)
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn deleting_a_shop_removes_its_reports(pool: PgPool) {
        let (service, owner) = seeded(&pool).await;
        let shop = service
            .create_shop(&owner, shop_payload("Always Open", "00:00", "23:59"))
            .await
            .unwrap();

        let reports = ReportRepository::new(pool.clone());
        reports
            .create(shop.id, owner.id, crate::models::report::ReportReason::Spam, "")
            .await
            .unwrap();

        let directory = OpenShopsQuery::default();
        assert_eq!(service.list_open_shops(&directory).await.unwrap().shops.len(), 1);

        service.delete_shop(shop.id).await.unwrap();

        assert!(matches!(service.get_shop(shop.id).await, Err(AppError::ShopNotFound)));
        let page = service.list_open_shops(&directory).await.unwrap();
        assert!(page.shops.is_empty());
        assert_eq!(page.matched_before_time_filter, 0);
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE shop_id = $1")
            .bind(shop.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(matches!(service.delete_shop(shop.id).await, Err(AppError::ShopNotFound)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn toggled_off_shop_leaves_the_directory(pool: PgPool) {
        let (service, owner) = seeded(&pool).await;
        let shop = service
            .create_shop(&owner, shop_payload("Always Open", "00:00", "23:59"))
            .await
            .unwrap();
        assert!(shop.is_approved && shop.is_active);

        let query = OpenShopsQuery::default();
        assert_eq!(service.list_open_shops(&query).await.unwrap().shops.len(), 1);

        let status = service.toggle_active(shop.id).await.unwrap();
        assert!(!status.is_active);
        let page = service.list_open_shops(&query).await.unwrap();
        assert!(page.shops.is_empty());
        assert_eq!(page.matched_before_time_filter, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn only_the_owner_or_an_admin_may_update(pool: PgPool) {
        let (service, owner) = seeded(&pool).await;
        let shop = service
            .create_shop(&owner, shop_payload("Late Night Pizza", "18:00", "02:00"))
            .await
            .unwrap();

        let stranger = UserRepository::new(pool.clone())
            .create_user("Other Poster", "other@nightmate.com", "hash", Role::Poster)
            .await
            .unwrap();
        let err = service
            .update_shop(&stranger, shop.id, shop_payload("Hijacked", "18:00", "02:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let updated = service
            .update_shop(&owner, shop.id, shop_payload("Later Night Pizza", "19:00", "03:00"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Later Night Pizza");
        assert_eq!(updated.close_time, at("03:00"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn directory_pages_count_only_open_shops(pool: PgPool) {
        let (service, owner) = seeded(&pool).await;
        // Closed shops interleaved with open ones must not create short pages
        for i in 0..6 {
            for (name, open, close) in [("open", "20:00", "04:00"), ("closed", "08:00", "12:00")] {
                service
                    .create_shop(&owner, shop_payload(&format!("{name}-{i}"), open, close))
                    .await
                    .unwrap();
            }
        }

        let repo = ShopRepository::new(pool.clone());
        let visible = ShopFilter::public(None, None);
        let open = visible.clone().only_open_at(at("01:00"));

        let first = repo.list(&open, &PageRequest { page: 1, limit: 4 }).await.unwrap();
        assert_eq!(first.len(), 4);
        assert!(first.iter().all(|s| s.name.starts_with("open-")));
        assert_eq!(repo.count(&open).await.unwrap(), 6);
        assert_eq!(repo.count(&visible).await.unwrap(), 12);

        let second = repo.list(&open, &PageRequest { page: 2, limit: 4 }).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(
            PageInfo::new(&PageRequest { page: 2, limit: 4 }, second.len(), 6),
            PageInfo { current: 2, total: 2, has_next: false, has_prev: true }
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn query_and_evaluator_agree_on_open_shops(pool: PgPool) {
        let (service, owner) = seeded(&pool).await;
        let windows = [
            ("09:00", "17:00"),
            ("22:00", "02:00"),
            ("10:00", "10:00"),
            ("00:00", "23:59"),
            ("18:00", "03:00"),
        ];
        for (open, close) in windows {
            service
                .create_shop(&owner, shop_payload(&format!("{open}-{close}"), open, close))
                .await
                .unwrap();
        }

        let repo = ShopRepository::new(pool.clone());
        let page = PageRequest { page: 1, limit: 50 };
        let instants = [
            "00:00", "01:59", "02:00", "02:01", "09:00", "10:00", "10:01", "17:00", "21:59", "22:00",
            "23:59",
        ];
        for now in instants {
            let filter = ShopFilter::public(None, None).only_open_at(at(now));
            let mut from_query: Vec<String> =
                repo.list(&filter, &page).await.unwrap().into_iter().map(|s| s.name).collect();
            from_query.sort();

            let mut expected: Vec<String> = windows
                .iter()
                .filter(|(open, close)| is_open_now(at(open), at(close), true, true, at(now)))
                .map(|(open, close)| format!("{open}-{close}"))
                .collect();
            expected.sort();

            assert_eq!(from_query, expected, "at {now}");
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn hidden_shops_never_reach_the_directory(pool: PgPool) {
        let (service, owner) = seeded(&pool).await;
        let hidden = service
            .create_shop(&owner, shop_payload("Hidden", "00:00", "23:59"))
            .await
            .unwrap();
        service
            .create_shop(&owner, shop_payload("Visible", "00:00", "23:59"))
            .await
            .unwrap();
        service.toggle_active(hidden.id).await.unwrap();

        let repo = ShopRepository::new(pool.clone());
        let filter = ShopFilter::public(None, None).only_open_at(at("12:00"));
        let shops = repo.list(&filter, &PageRequest { page: 1, limit: 50 }).await.unwrap();
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].name, "Visible");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn report_racing_a_delete_waits_for_the_shop_lock(pool: PgPool) {
        let (service, owner) = seeded(&pool).await;
        let shop = service
            .create_shop(&owner, shop_payload("Doomed Diner", "18:00", "02:00"))
            .await
            .unwrap();

        let shops = ShopRepository::new(pool.clone());
        let reports = ReportRepository::new(pool.clone());

        let mut tx = pool.begin().await.unwrap();
        assert!(shops.lock(&mut *tx, shop.id).await.unwrap());

        let racing = {
            let reports = reports.clone();
            let (shop_id, reporter) = (shop.id, owner.id);
            tokio::spawn(async move {
                reports
                    .create(shop_id, reporter, crate::models::report::ReportReason::ShopClosed, "")
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(!racing.is_finished());

        reports.delete_by_shop(&mut *tx, shop.id).await.unwrap();
        assert_eq!(shops.delete(&mut *tx, shop.id).await.unwrap(), 1);
        tx.commit().await.unwrap();

        assert!(matches!(racing.await.unwrap(), Err(AppError::ShopNotFound)));
        assert!(!shops.lock(&pool, shop.id).await.unwrap());
    }
}
