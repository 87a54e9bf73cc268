use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// Writes are single atomic document updates; two concurrent saves of the
/// same entity race with last-write-wins semantics and no version check.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity. Fails with a constraint violation when a unique
    /// field (id, email) is already taken.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Listing methods return each post together with its
/// owner, since both the public feed and the moderation queue annotate
/// entries with owner details.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Number of approved posts, for page-count computation.
    async fn count_approved(&self) -> Result<u64, RepoError>;

    /// One page of approved posts. `page` is 1-based.
    async fn list_approved(&self, page: u64, per_page: u64)
    -> Result<Vec<(Post, User)>, RepoError>;

    /// Every post regardless of status, newest first, for the moderation
    /// queue.
    async fn list_all(&self) -> Result<Vec<(Post, User)>, RepoError>;

    /// A single post with its owner, regardless of status.
    async fn find_with_owner(&self, id: Uuid) -> Result<Option<(Post, User)>, RepoError>;

    /// Remove every post. Returns the number deleted.
    async fn delete_all(&self) -> Result<u64, RepoError>;
}
