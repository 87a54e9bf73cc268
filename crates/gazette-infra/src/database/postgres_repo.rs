//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use gazette_core::domain::{Post, User};
use gazette_core::error::RepoError;
use gazette_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity, PostStatus};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count_approved(&self) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::Status.eq(PostStatus::Approved))
            .count(&*self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))
    }

    async fn list_approved(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Vec<(Post, User)>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::Status.eq(PostStatus::Approved))
            .find_also_related(UserEntity)
            .order_by_asc(post::Column::CreatedAt)
            .offset(page.saturating_sub(1) * per_page)
            .limit(per_page)
            .all(&*self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        rows.into_iter().map(join_owner).collect()
    }

    async fn list_all(&self) -> Result<Vec<(Post, User)>, RepoError> {
        let rows = PostEntity::find()
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        rows.into_iter().map(join_owner).collect()
    }

    async fn find_with_owner(&self, id: uuid::Uuid) -> Result<Option<(Post, User)>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&*self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        row.map(join_owner).transpose()
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .exec(&*self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

/// The owner foreign key is NOT NULL, so a missing joined row is a broken
/// constraint, not an expected case.
fn join_owner((post, owner): (post::Model, Option<user::Model>)) -> Result<(Post, User), RepoError> {
    let owner = owner.ok_or_else(|| RepoError::Constraint("post owner missing".to_string()))?;
    Ok((post.into(), owner.into()))
}
