// src/db/preference_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::theme::{ClientInfo, GuestPreference, Theme},
};

const PREFERENCE_COLUMNS: &str = "id, session_id, theme_preference, ip_address, user_agent, \
                                  last_accessed, expires_at, created_at, updated_at";

// Guest (session keyed) theme preferences
#[derive(Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the live preference for `session_id` and bumps its last access.
    /// Expired rows are treated as missing.
    pub async fn find_and_touch(&self, session_id: &str) -> Result<Option<GuestPreference>, AppError> {
        let sql = format!(
            "UPDATE user_preferences SET last_accessed = NOW() \
             WHERE session_id = $1 AND expires_at > NOW() \
             RETURNING {PREFERENCE_COLUMNS}"
        );
        let preference = sqlx::query_as::<_, GuestPreference>(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(preference)
    }

    /// Idempotent upsert keyed by session id; every write pushes the expiry forward.
    pub async fn upsert(
        &self,
        session_id: &str,
        theme: Theme,
        client: &ClientInfo,
        expires_at: DateTime<Utc>,
    ) -> Result<GuestPreference, AppError> {
        let sql = format!(
            "INSERT INTO user_preferences \
                 (session_id, theme_preference, ip_address, user_agent, last_accessed, expires_at) \
             VALUES ($1, $2, $3, $4, NOW(), $5) \
             ON CONFLICT (session_id) DO UPDATE SET \
                 theme_preference = EXCLUDED.theme_preference, \
                 ip_address = EXCLUDED.ip_address, \
                 user_agent = EXCLUDED.user_agent, \
                 last_accessed = NOW(), \
                 expires_at = EXCLUDED.expires_at, \
                 updated_at = NOW() \
             RETURNING {PREFERENCE_COLUMNS}"
        );
        let preference = sqlx::query_as::<_, GuestPreference>(&sql)
            .bind(session_id)
            .bind(theme)
            .bind(client.ip_address.as_deref())
            .bind(client.user_agent.as_deref())
            .bind(expires_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(preference)
    }

    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM user_preferences WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
