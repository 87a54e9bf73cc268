//! # Gazette Infrastructure
//!
//! Concrete implementations of the ports defined in `gazette-core`:
//! database repositories, credential services and image storage.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory repositories and local storage only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT + Argon2 credential services

pub mod database;
pub mod storage;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::memory::{InMemoryPostRepository, InMemoryStore, InMemoryUserRepository};
pub use storage::LocalImageStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

pub use database::DatabaseConfig;
