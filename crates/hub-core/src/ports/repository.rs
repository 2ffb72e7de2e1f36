use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostDraft, UserProfile};
use crate::error::RepoError;

/// Post store port.
///
/// The store is document-shaped: a post is read and written as a whole
/// aggregate, and mutation happens through [`PostRepository::replace`], a
/// conditional whole-document swap keyed on the revision read. There is no
/// partial-update or delete operation.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post. The store assigns the id, the creation timestamp
    /// and revision zero.
    async fn insert(&self, draft: PostDraft) -> Result<Post, RepoError>;

    /// Fetch one post by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// All posts, newest first. Tie order between equal timestamps is
    /// unspecified.
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError>;

    /// Replace the stored aggregate iff its revision still equals
    /// `expected_revision`; fails with [`RepoError::Conflict`] otherwise.
    /// Returns the post as stored, with the revision bumped.
    async fn replace(&self, post: &Post, expected_revision: i64) -> Result<Post, RepoError>;
}

/// User profile store port.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, profile: UserProfile) -> Result<UserProfile, RepoError>;

    async fn find_by_uid(&self, uid: Uuid) -> Result<Option<UserProfile>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepoError>;

    /// All profiles, newest account first. Backs the user directory.
    async fn list_newest_first(&self) -> Result<Vec<UserProfile>, RepoError>;

    /// Stamp the profile's `last_seen` with the store's current time.
    async fn touch_last_seen(&self, uid: Uuid) -> Result<(), RepoError>;

    /// Bump the denormalized lifetime comment counter by one.
    async fn increment_comment_count(&self, uid: Uuid) -> Result<(), RepoError>;
}
