// src/services/theme_service.rs

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PreferenceRepository, UserRepository},
    models::{
        auth::User,
        theme::{ClientInfo, GuestThemeData, Theme, GUEST_PREFERENCE_TTL_DAYS},
    },
};

#[derive(Clone)]
pub struct ThemeService {
    user_repo: UserRepository,
    preference_repo: PreferenceRepository,
}

impl ThemeService {
    pub fn new(user_repo: UserRepository, preference_repo: PreferenceRepository) -> Self {
        Self { user_repo, preference_repo }
    }

    pub async fn set_user_theme(&self, user: &User, theme: Theme) -> Result<Theme, AppError> {
        let user = self
            .user_repo
            .update_theme(user.id, theme)
            .await?
            .ok_or(AppError::UserNotFound)?;
        Ok(user.theme_preference)
    }

    /// Current guest theme. Unknown or expired sessions fall back to the
    /// default theme and keep their id; a missing id gets a fresh one.
    pub async fn guest_theme(&self, session_id: Option<&str>) -> Result<GuestThemeData, AppError> {
        let Some(session_id) = session_id else {
            return Ok(GuestThemeData {
                session_id: generate_session_id(),
                theme_preference: Theme::default(),
            });
        };

        let theme_preference = self
            .preference_repo
            .find_and_touch(session_id)
            .await?
            .map(|preference| preference.theme_preference)
            .unwrap_or_default();

        Ok(GuestThemeData { session_id: session_id.to_string(), theme_preference })
    }

    /// Upserts the guest preference and pushes its expiry forward.
    pub async fn save_guest_theme(
        &self,
        session_id: Option<&str>,
        theme: Theme,
        client: &ClientInfo,
    ) -> Result<GuestThemeData, AppError> {
        let session_id = session_id.map(str::to_string).unwrap_or_else(generate_session_id);
        let expires_at = Utc::now() + Duration::days(GUEST_PREFERENCE_TTL_DAYS);

        let preference = self
            .preference_repo
            .upsert(&session_id, theme, client, expires_at)
            .await?;

        Ok(GuestThemeData {
            session_id: preference.session_id,
            theme_preference: preference.theme_preference,
        })
    }

    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let purged = self.preference_repo.purge_expired().await?;
        if purged > 0 {
            tracing::info!(purged, "expired guest preferences removed");
        }
        Ok(purged)
    }
}

/// Opaque 64 hex character guest session id (256 random bits).
pub fn generate_session_id() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
