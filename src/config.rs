// src/config.rs

use anyhow::Context;
use chrono::{Duration as ChronoDuration, FixedOffset};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use crate::{
    db::{PreferenceRepository, ReportRepository, ShopRepository, UserRepository},
    services::{AdminService, AuthService, ReportService, ShopService, ThemeService},
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:3002",
    "http://localhost:5173",
];

// Account created (or promoted) at startup when ADMIN_EMAIL and ADMIN_PASSWORD are set
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    pub jwt_ttl_days: i64,
    pub cors_origins: Vec<String>,
    pub app_env: String,
    /// Zone shop hours are written in. `None` means the server's local zone.
    pub shop_hours_utc_offset: Option<FixedOffset>,
    pub frontend_dist: Option<PathBuf>,
    pub admin_account: Option<AdminAccount>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:5000")?;

        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.parse::<u32>().context("DATABASE_MAX_CONNECTIONS must be a number")?,
            None => 5,
        };

        let jwt_ttl_days = match var("JWT_TTL_DAYS") {
            Some(value) => value.parse::<i64>().context("JWT_TTL_DAYS must be a number")?,
            None => 7,
        };

        let cors_origins = match var("CORS_ORIGINS") {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let shop_hours_utc_offset = var("SHOP_HOURS_UTC_OFFSET")
            .map(|value| parse_utc_offset(&value))
            .transpose()?;

        let admin_account = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminAccount {
                name: var("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            database_max_connections,
            jwt_ttl_days,
            cors_origins,
            app_env: var("APP_ENV").unwrap_or_else(|| "development".to_string()),
            shop_hours_utc_offset,
            frontend_dist: var("FRONTEND_DIST").map(PathBuf::from),
            admin_account,
        })
    }
}

/// Accepts `+HH:MM` / `-HH:MM`.
pub fn parse_utc_offset(value: &str) -> anyhow::Result<FixedOffset> {
    value
        .parse::<FixedOffset>()
        .map_err(|e| anyhow::anyhow!("SHOP_HOURS_UTC_OFFSET '{value}' is not a valid offset: {e}"))
}

// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub shop_service: ShopService,
    pub report_service: ReportService,
    pub theme_service: ThemeService,
    pub admin_service: AdminService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("could not connect to the database")?;

        tracing::info!("database connection established");

        Ok(Self::from_pool(db_pool, config))
    }

    /// Wires repositories and services on top of an existing pool.
    pub fn from_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let shop_repo = ShopRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let preference_repo = PreferenceRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            ChronoDuration::days(config.jwt_ttl_days),
        );
        let shop_service = ShopService::new(
            db_pool.clone(),
            shop_repo.clone(),
            report_repo.clone(),
            config.shop_hours_utc_offset,
        );
        let report_service = ReportService::new(report_repo.clone(), shop_repo.clone());
        let theme_service = ThemeService::new(user_repo.clone(), preference_repo);
        let admin_service = AdminService::new(user_repo, shop_repo, report_repo);

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            shop_service,
            report_service,
            theme_service,
            admin_service,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    pub(crate) fn test_config() -> Config {
        Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://nightmate@localhost/nightmate"),
            ("JWT_SECRET", "test-secret"),
            ("APP_ENV", "test"),
        ]))
        .unwrap()
    }

    #[test]
    fn defaults_apply() {
        let config = test_config();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.jwt_ttl_days, 7);
        assert_eq!(config.cors_origins.len(), 4);
        assert!(config.shop_hours_utc_offset.is_none());
        assert!(config.admin_account.is_none());
        assert!(config.frontend_dist.is_none());
    }

    #[test]
    fn required_values_must_be_present() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "x")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", " ")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn optional_values_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("CORS_ORIGINS", "https://nightmate.app, ,https://admin.nightmate.app"),
            ("SHOP_HOURS_UTC_OFFSET", "-05:00"),
            ("ADMIN_EMAIL", "root@nightmate.app"),
            ("ADMIN_PASSWORD", "changeme"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.cors_origins, vec!["https://nightmate.app", "https://admin.nightmate.app"]);
        assert_eq!(config.shop_hours_utc_offset.map(|o| o.local_minus_utc()), Some(-5 * 3600));
        let admin = config.admin_account.unwrap();
        assert_eq!(admin.name, "Administrator");
        assert_eq!(admin.email, "root@nightmate.app");
    }

    #[test]
    fn utc_offsets() {
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(parse_utc_offset("+00:00").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("banana").is_err());
    }
}
