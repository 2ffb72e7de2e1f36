//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use hub_core::ports::{Cache, PostRepository, UserRepository};
use hub_core::service::ForumService;
use hub_infra::cache::InMemoryCache;
use hub_infra::database::{InMemoryPostRepository, InMemoryUserRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub forum: Arc<ForumService>,
    pub users: Arc<dyn UserRepository>,
    pub cache: Arc<dyn Cache>,
    pub op_timeout: Duration,
    pub listing_ttl: Duration,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());

        #[cfg(feature = "postgres")]
        let (posts, users): (Arc<dyn PostRepository>, Arc<dyn UserRepository>) = {
            use hub_infra::database::{
                DatabaseConnections, PostgresPostRepository, PostgresUserRepository,
            };

            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => (
                        Arc::new(PostgresPostRepository::new(connections.main.clone())),
                        Arc::new(PostgresUserRepository::new(connections.main)),
                    ),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        in_memory_repos()
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                in_memory_repos()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (posts, users): (Arc<dyn PostRepository>, Arc<dyn UserRepository>) = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            in_memory_repos()
        };

        let forum = Arc::new(
            ForumService::new(posts, users.clone()).with_write_attempts(config.write_attempts),
        );

        tracing::info!("Application state initialized");

        Self {
            forum,
            users,
            cache,
            op_timeout: config.op_timeout,
            listing_ttl: config.listing_ttl,
        }
    }
}

fn in_memory_repos() -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
    (
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
    )
}
