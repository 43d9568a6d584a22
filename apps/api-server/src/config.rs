//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use blog_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations before serving.
    pub run_migrations: bool,
    pub posts_per_page: u64,
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn flag_env(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | ""))
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parse_env("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parse_env("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            if let Some(log) = flag_env("DB_SQL_LOGGING") {
                config.sql_logging = log;
            }
            config
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("PORT").unwrap_or(8080),
            database,
            run_migrations: flag_env("RUN_MIGRATIONS").unwrap_or(false),
            posts_per_page: parse_env("POSTS_PER_PAGE")
                .filter(|n: &u64| *n > 0)
                .unwrap_or(3),
        }
    }
}
