use std::time::Duration;

#[cfg(feature = "postgres")]
use std::sync::Arc;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the blog database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    /// Log every statement sqlx executes.
    pub sql_logging: bool,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 100,
            min_connections: 10,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            sql_logging: true,
        }
    }
}

/// Pooled connection to the blog database, shared by every repository.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct DatabaseConnections {
    pub main: Arc<DbConn>,
}

#[cfg(not(feature = "postgres"))]
#[derive(Clone)]
pub struct DatabaseConnections;

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    /// Open the connection pool described by `config`.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .sqlx_logging(config.sql_logging)
            .to_owned();

        let main = Database::connect(opts).await?;
        tracing::info!(
            max_connections = config.max_connections,
            "Database connected"
        );

        Ok(Self {
            main: Arc::new(main),
        })
    }

    /// Round-trip a trivial statement to check the pool is usable.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.main.ping().await
    }
}
