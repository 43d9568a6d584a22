//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{CommentRepository, PostRepository, TagRepository, UserRepository};
use blog_infra::InMemoryBlogStore;
use blog_infra::database::DatabaseConnections;

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use blog_infra::database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};

/// Which store backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    Memory,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Postgres => "postgres",
            Storage::Memory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub db: Option<Arc<DatabaseConnections>>,
    pub storage: Storage,
    pub posts_per_page: u64,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            let connections = DatabaseConnections::init(db_config).await?;

            if config.run_migrations {
                use migration::{Migrator, MigratorTrait};

                tracing::info!("Applying pending migrations");
                Migrator::up(connections.main.as_ref(), None).await?;
            }

            tracing::info!("Application state initialized (postgres)");
            return Ok(Self::postgres(connections, config.posts_per_page));
        }

        if config.database.is_some() {
            tracing::warn!("DATABASE_URL set but the postgres feature is disabled");
        } else {
            tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
        }

        Ok(Self::in_memory(
            InMemoryBlogStore::new(),
            config.posts_per_page,
        ))
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(connections: DatabaseConnections, posts_per_page: u64) -> Self {
        let main = connections.main.clone();
        Self {
            users: Arc::new(PostgresUserRepository::new(main.clone())),
            posts: Arc::new(PostgresPostRepository::new(main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(main.clone())),
            tags: Arc::new(PostgresTagRepository::new(main)),
            db: Some(Arc::new(connections)),
            storage: Storage::Postgres,
            posts_per_page,
        }
    }

    pub fn in_memory(store: InMemoryBlogStore, posts_per_page: u64) -> Self {
        Self {
            users: Arc::new(store.users()),
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
            tags: Arc::new(store.tags()),
            db: None,
            storage: Storage::Memory,
            posts_per_page,
        }
    }
}
