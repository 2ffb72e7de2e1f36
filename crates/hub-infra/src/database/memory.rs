//! In-memory repositories - used when no database is configured and in
//! tests. Same conditional-replace contract as the Postgres adapters,
//! enforced under the write lock. Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use hub_core::domain::{Post, PostDraft, UserProfile};
use hub_core::error::RepoError;
use hub_core::ports::{PostRepository, UserRepository};

/// In-memory post store.
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, draft: PostDraft) -> Result<Post, RepoError> {
        let post = Post::from_draft(draft, Uuid::new_v4(), Utc::now());
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
        let mut all: Vec<Post> = self.posts.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn replace(&self, post: &Post, expected_revision: i64) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let stored = posts.get_mut(&post.id).ok_or(RepoError::Conflict)?;
        if stored.revision != expected_revision {
            return Err(RepoError::Conflict);
        }

        let mut next = post.clone();
        next.revision = expected_revision + 1;
        *stored = next.clone();
        Ok(next)
    }
}

/// In-memory user profile store.
pub struct InMemoryUserRepository {
    profiles: RwLock<HashMap<Uuid, UserProfile>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, profile: UserProfile) -> Result<UserProfile, RepoError> {
        let mut profiles = self.profiles.write().await;
        let duplicate = profiles
            .values()
            .any(|p| p.email == profile.email || p.uid == profile.uid);
        if duplicate {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        profiles.insert(profile.uid, profile.clone());
        Ok(profile)
    }

    async fn find_by_uid(&self, uid: Uuid) -> Result<Option<UserProfile>, RepoError> {
        Ok(self.profiles.read().await.get(&uid).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepoError> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .find(|p| p.email.as_str() == email)
            .cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<UserProfile>, RepoError> {
        let mut all: Vec<UserProfile> = self.profiles.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn touch_last_seen(&self, uid: Uuid) -> Result<(), RepoError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(&uid).ok_or(RepoError::NotFound)?;
        profile.last_seen = Utc::now();
        Ok(())
    }

    async fn increment_comment_count(&self, uid: Uuid) -> Result<(), RepoError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(&uid).ok_or(RepoError::NotFound)?;
        profile.comment_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hub_core::domain::Identity;

    use super::*;

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            content: "body".to_string(),
            author: Identity::from("a@x.com"),
            author_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_revision_zero() {
        let repo = InMemoryPostRepository::new();

        let post = repo.insert(draft("t")).await.unwrap();

        assert_eq!(post.revision, 0);
        let found = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(found, post);
    }

    #[tokio::test]
    async fn replace_bumps_revision() {
        let repo = InMemoryPostRepository::new();
        let mut post = repo.insert(draft("t")).await.unwrap();

        post.apply_vote(&Identity::from("b@x.com"), hub_core::domain::VoteIntent::Upvote);
        let stored = repo.replace(&post, 0).await.unwrap();

        assert_eq!(stored.revision, 1);
        assert_eq!(stored.upvotes, 1);
    }

    #[tokio::test]
    async fn stale_replace_is_rejected() {
        let repo = InMemoryPostRepository::new();
        let post = repo.insert(draft("t")).await.unwrap();

        repo.replace(&post, 0).await.unwrap();

        // Second writer still holds revision 0.
        let err = repo.replace(&post, 0).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_constraint_violation() {
        let repo = InMemoryUserRepository::new();
        let first = UserProfile::new(Identity::from("a@x.com"), "h".into());
        let second = UserProfile::new(Identity::from("a@x.com"), "h".into());

        repo.insert(first).await.unwrap();
        let err = repo.insert(second).await.unwrap_err();

        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn increment_comment_count_requires_a_profile() {
        let repo = InMemoryUserRepository::new();

        let err = repo.increment_comment_count(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, RepoError::NotFound));
    }
}
