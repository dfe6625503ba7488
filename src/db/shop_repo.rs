// src/db/shop_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        pagination::PageRequest,
        shop::{ShopFields, ShopFilter, ShopRecord},
    },
};

// Shop columns plus the owner's name/email. Expects aliases `s` (shops) and `u` (users).
const SHOP_PROJECTION: &str = "SELECT s.id, s.name, s.category, s.owner_id, s.address, s.city, \
     s.latitude, s.longitude, s.open_time, s.close_time, s.is_approved, s.is_active, \
     s.description, s.phone, s.rating, s.review_count, s.created_at, s.updated_at, \
     u.name AS owner_name, u.email AS owner_email";

const SHOP_FROM: &str = " FROM shops s JOIN users u ON u.id = s.owner_id";

#[derive(Clone)]
pub struct ShopRepository {
    pool: PgPool,
}

impl ShopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a shop owned by `owner_id`. New shops are published immediately.
    pub async fn create(&self, owner_id: Uuid, fields: &ShopFields) -> Result<ShopRecord, AppError> {
        let sql = format!(
            "WITH s AS (
                INSERT INTO shops (
                    name, category, owner_id, address, city, latitude, longitude,
                    open_time, close_time, description, phone, is_approved, is_active
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE, TRUE)
                RETURNING *
            )
            {SHOP_PROJECTION} FROM s JOIN users u ON u.id = s.owner_id"
        );

        let shop = sqlx::query_as::<_, ShopRecord>(&sql)
            .bind(&fields.name)
            .bind(fields.category)
            .bind(owner_id)
            .bind(&fields.address)
            .bind(&fields.city)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(fields.open_time)
            .bind(fields.close_time)
            .bind(&fields.description)
            .bind(&fields.phone)
            .fetch_one(&self.pool)
            .await?;

        Ok(shop)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ShopRecord>, AppError> {
        let sql = format!("{SHOP_PROJECTION}{SHOP_FROM} WHERE s.id = $1");
        let shop = sqlx::query_as::<_, ShopRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shop)
    }

    pub async fn list(
        &self,
        filter: &ShopFilter,
        page: &PageRequest,
    ) -> Result<Vec<ShopRecord>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("{SHOP_PROJECTION}{SHOP_FROM}"));
        push_shop_filter(&mut qb, filter);
        qb.push(" ORDER BY s.created_at DESC, s.id LIMIT ")
            .push_bind(page.sql_limit())
            .push(" OFFSET ")
            .push_bind(page.sql_offset());

        let shops = qb.build_query_as::<ShopRecord>().fetch_all(&self.pool).await?;
        Ok(shops)
    }

    pub async fn count(&self, filter: &ShopFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM shops s");
        push_shop_filter(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ShopRecord>, AppError> {
        let sql = format!(
            "{SHOP_PROJECTION}{SHOP_FROM} WHERE s.owner_id = $1 ORDER BY s.created_at DESC, s.id"
        );
        let shops = sqlx::query_as::<_, ShopRecord>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(shops)
    }

    /// Replaces the editable fields. Flags and ownership are left alone.
    pub async fn update(&self, id: Uuid, fields: &ShopFields) -> Result<Option<ShopRecord>, AppError> {
        let sql = format!(
            "WITH s AS (
                UPDATE shops SET
                    name = $2, category = $3, address = $4, city = $5,
                    latitude = $6, longitude = $7, open_time = $8, close_time = $9,
                    description = $10, phone = $11, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            {SHOP_PROJECTION} FROM s JOIN users u ON u.id = s.owner_id"
        );

        let shop = sqlx::query_as::<_, ShopRecord>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(fields.category)
            .bind(&fields.address)
            .bind(&fields.city)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(fields.open_time)
            .bind(fields.close_time)
            .bind(&fields.description)
            .bind(&fields.phone)
            .fetch_optional(&self.pool)
            .await?;

        Ok(shop)
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<Option<ShopRecord>, AppError> {
        let sql = format!(
            "WITH s AS (
                UPDATE shops SET is_active = NOT is_active, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            {SHOP_PROJECTION} FROM s JOIN users u ON u.id = s.owner_id"
        );
        let shop = sqlx::query_as::<_, ShopRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shop)
    }

    /// Row-locks the shop for the rest of the transaction. `false` when it does not exist.
    pub async fn lock<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM shops WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(locked.is_some())
    }

    /// Returns the number of deleted rows (0 or 1).
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM shops WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

// Escapes LIKE wildcards so user input is matched literally
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_shop_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ShopFilter) {
    qb.push(" WHERE TRUE");
    if let Some(is_active) = filter.is_active {
        qb.push(" AND s.is_active = ").push_bind(is_active);
    }
    if let Some(is_approved) = filter.is_approved {
        qb.push(" AND s.is_approved = ").push_bind(is_approved);
    }
    if let Some(category) = filter.category {
        qb.push(" AND s.category = ").push_bind(category);
    }
    if let Some(city) = &filter.city_contains {
        qb.push(" AND s.city ILIKE ")
            .push_bind(format!("%{}%", escape_like(city)))
            .push(" ESCAPE '\\'");
    }
    // Same rule as OpenWindow::contains: inclusive ends, close < open wraps midnight
    if let Some(now) = filter.open_at {
        qb.push(" AND ((s.open_time <= s.close_time AND ")
            .push_bind(now)
            .push(" BETWEEN s.open_time AND s.close_time) OR (s.close_time < s.open_time AND (")
            .push_bind(now)
            .push(" >= s.open_time OR ")
            .push_bind(now)
            .push(" <= s.close_time)))");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::shop::ShopCategory;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("new york"), "new york");
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
    }

    #[test]
    fn public_filter_sql_always_checks_visibility() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM shops s");
        push_shop_filter(&mut qb, &ShopFilter::public(Some(ShopCategory::Food), Some("york")));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM shops s WHERE TRUE AND s.is_active = $1 AND s.is_approved = $2 \
             AND s.category = $3 AND s.city ILIKE $4 ESCAPE '\\'"
        );
    }

    #[test]
    fn open_filter_sql_handles_overnight_windows() {
        let now = chrono::NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM shops s");
        push_shop_filter(&mut qb, &ShopFilter::public(None, None).only_open_at(now));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM shops s WHERE TRUE AND s.is_active = $1 AND s.is_approved = $2 \
             AND ((s.open_time <= s.close_time AND $3 BETWEEN s.open_time AND s.close_time) \
             OR (s.close_time < s.open_time AND ($4 >= s.open_time OR $5 <= s.close_time)))"
        );
    }

    #[test]
    fn empty_filter_matches_everything() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM shops s");
        push_shop_filter(&mut qb, &ShopFilter::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM shops s WHERE TRUE");
    }
}
