//! Application state - shared across all handlers.

use std::sync::Arc;

use gazette_core::ports::{
    ImageStore, PasswordService, PostRepository, TokenService, UserRepository,
};
use gazette_infra::database::memory::{
    InMemoryPostRepository, InMemoryStore, InMemoryUserRepository,
};
use gazette_infra::{
    Argon2PasswordService, DatabaseConnections, JwtTokenService, LocalImageStore,
    PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub images: Arc<dyn ImageStore>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) =
            match &config.database {
                Some(db_config) => match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        let shared = Arc::new(connections.main);
                        (
                            Arc::new(PostgresUserRepository::from_shared(shared.clone())),
                            Arc::new(PostgresPostRepository::from_shared(shared)),
                        )
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        Self::memory_repos()
                    }
                },
                None => {
                    tracing::warn!(
                        "DATABASE_URL not set. Running without database (in-memory mode)."
                    );
                    Self::memory_repos()
                }
            };

        tracing::info!("Application state initialized");

        Self {
            users,
            posts,
            images: Arc::new(LocalImageStore::new(&config.upload_dir, "/uploads")),
            tokens: Arc::new(JwtTokenService::from_env()),
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    fn memory_repos() -> (Arc<dyn UserRepository>, Arc<dyn PostRepository>) {
        let store = InMemoryStore::new();
        (
            Arc::new(InMemoryUserRepository::new(store.clone())),
            Arc::new(InMemoryPostRepository::new(store)),
        )
    }
}
