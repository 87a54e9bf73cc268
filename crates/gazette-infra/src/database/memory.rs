//! In-memory repositories - used as fallback when no database is configured
//! and as the backend for handler-level tests. Data is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use gazette_core::domain::{ModerationStatus, Post, User};
use gazette_core::error::RepoError;
use gazette_core::ports::{BaseRepository, PostRepository, UserRepository};

/// Shared backing store. Both repositories hold a handle so post listings
/// can join owners.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        // Write-time uniqueness: id and email both act as unique keys.
        if users.contains_key(&user.id)
            || users.values().any(|u| u.email == user.email)
        {
            return Err(RepoError::Constraint("entity already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryPostRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    async fn owner_of(&self, post: &Post) -> Result<User, RepoError> {
        self.store
            .users
            .read()
            .await
            .get(&post.owner_id)
            .cloned()
            .ok_or_else(|| RepoError::Constraint("post owner missing".to_string()))
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.store.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("entity already exists".to_string()));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.store.posts.write().await;
        if !posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.posts.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn count_approved(&self) -> Result<u64, RepoError> {
        let posts = self.store.posts.read().await;
        Ok(posts
            .values()
            .filter(|p| p.status == ModerationStatus::Approved)
            .count() as u64)
    }

    async fn list_approved(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Vec<(Post, User)>, RepoError> {
        let mut approved: Vec<Post> = {
            let posts = self.store.posts.read().await;
            posts
                .values()
                .filter(|p| p.status == ModerationStatus::Approved)
                .cloned()
                .collect()
        };
        approved.sort_by_key(|p| p.created_at);

        let offset = page.saturating_sub(1).saturating_mul(per_page) as usize;
        let mut out = Vec::new();
        for post in approved.into_iter().skip(offset).take(per_page as usize) {
            let owner = self.owner_of(&post).await?;
            out.push((post, owner));
        }
        Ok(out)
    }

    async fn list_all(&self) -> Result<Vec<(Post, User)>, RepoError> {
        let mut all: Vec<Post> = self.store.posts.read().await.values().cloned().collect();
        all.sort_by_key(|p| std::cmp::Reverse(p.created_at));

        let mut out = Vec::new();
        for post in all {
            let owner = self.owner_of(&post).await?;
            out.push((post, owner));
        }
        Ok(out)
    }

    async fn find_with_owner(&self, id: Uuid) -> Result<Option<(Post, User)>, RepoError> {
        let Some(post) = self.store.posts.read().await.get(&id).cloned() else {
            return Ok(None);
        };
        let owner = self.owner_of(&post).await?;
        Ok(Some((post, owner)))
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let mut posts = self.store.posts.write().await;
        let removed = posts.len() as u64;
        posts.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_core::domain::{PostDraft, Role};

    fn user(email: &str) -> User {
        User::new(
            "Ada".to_string(),
            email.to_string(),
            "$argon2$hash".to_string(),
            Role::User,
        )
    }

    fn draft(n: u32) -> PostDraft {
        PostDraft {
            title: format!("Post {n}"),
            content: "body".to_string(),
            category: "IT".to_string(),
            tags: Vec::new(),
            image: Some("/uploads/i.png".to_string()),
        }
    }

    #[tokio::test]
    async fn duplicate_email_violates_constraint() {
        let store = InMemoryStore::new();
        let repo = InMemoryUserRepository::new(store);

        repo.insert(user("ada@example.com")).await.unwrap();
        let err = repo.insert(user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn update_of_missing_entity_is_not_found() {
        let store = InMemoryStore::new();
        let repo = InMemoryUserRepository::new(store);

        let err = repo.update(user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn approved_listing_filters_and_paginates() {
        let store = InMemoryStore::new();
        let users = InMemoryUserRepository::new(store.clone());
        let posts = InMemoryPostRepository::new(store);

        let owner = users.insert(user("ada@example.com")).await.unwrap();
        for n in 0..7 {
            let mut post = draft(n).submit(owner.id).unwrap();
            if n % 2 == 0 {
                post.approve();
            }
            posts.insert(post).await.unwrap();
        }

        // 4 approved posts (n = 0, 2, 4, 6)
        assert_eq!(posts.count_approved().await.unwrap(), 4);

        let page1 = posts.list_approved(1, 3).await.unwrap();
        assert_eq!(page1.len(), 3);
        let page2 = posts.list_approved(2, 3).await.unwrap();
        assert_eq!(page2.len(), 1);
        assert!(page1
            .iter()
            .chain(page2.iter())
            .all(|(p, _)| p.status == ModerationStatus::Approved));
    }

    #[tokio::test]
    async fn admin_listing_is_newest_first() {
        let store = InMemoryStore::new();
        let users = InMemoryUserRepository::new(store.clone());
        let posts = InMemoryPostRepository::new(store);

        let owner = users.insert(user("ada@example.com")).await.unwrap();
        for n in 0..3 {
            posts
                .insert(draft(n).submit(owner.id).unwrap())
                .await
                .unwrap();
        }

        let all = posts.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].0.created_at >= w[1].0.created_at));
    }
}
