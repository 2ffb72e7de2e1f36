//! Forum service - posting, voting and commenting against the store ports.
//!
//! Every mutation of a post aggregate goes through a read-apply-replace loop:
//! the replace is conditional on the revision that was read, and a losing
//! writer re-reads and re-applies instead of clobbering the winner. The loop
//! is bounded; exhausting it surfaces [`DomainError::Conflict`].

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, Identity, Post, PostDraft, VoteIntent};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, UserRepository};

const DEFAULT_WRITE_ATTEMPTS: u32 = 3;

/// Outcome of appending a comment.
///
/// The append and the per-identity counter bump are two independent writes
/// with no transaction between them. When the second write fails, the comment
/// is already committed; that state is reported, not rolled back.
#[derive(Debug)]
pub enum CommentAppend {
    /// Comment appended and the author's lifetime counter bumped.
    Committed { post: Post, comment: Comment },
    /// Comment appended but the counter write failed; the store is left
    /// inconsistent until an external reconciliation.
    PartialFailure {
        post: Post,
        comment: Comment,
        error: String,
    },
}

impl CommentAppend {
    pub fn comment(&self) -> &Comment {
        match self {
            Self::Committed { comment, .. } | Self::PartialFailure { comment, .. } => comment,
        }
    }

    pub fn post(&self) -> &Post {
        match self {
            Self::Committed { post, .. } | Self::PartialFailure { post, .. } => post,
        }
    }
}

/// Forum application service.
pub struct ForumService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    max_write_attempts: u32,
}

impl ForumService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            posts,
            users,
            max_write_attempts: DEFAULT_WRITE_ATTEMPTS,
        }
    }

    /// Override the bound on conditional-write retries.
    pub fn with_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    /// Create a post. Title and content must be non-empty after trimming;
    /// nothing is written otherwise.
    pub async fn create_post(
        &self,
        author: Identity,
        author_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Post, DomainError> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() {
            return Err(DomainError::Validation("Title cannot be empty".into()));
        }
        if content.is_empty() {
            return Err(DomainError::Validation("Content cannot be empty".into()));
        }

        let draft = PostDraft {
            title: title.to_string(),
            content: content.to_string(),
            author,
            author_id,
        };

        let post = self.posts.insert(draft).await.map_err(store_failure)?;
        tracing::info!(post_id = %post.id, "Post created");
        Ok(post)
    }

    /// All posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.posts.list_newest_first().await.map_err(store_failure)
    }

    /// Apply one vote transition for `actor` on the given post.
    pub async fn vote(
        &self,
        post_id: Uuid,
        actor: &Identity,
        intent: VoteIntent,
    ) -> Result<Post, DomainError> {
        self.mutate_post(post_id, |post| {
            post.apply_vote(actor, intent);
        })
        .await
    }

    /// Append a comment to a post and bump the author's lifetime comment
    /// counter. Blank text (after trimming) is rejected before any write.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author: Identity,
        author_id: Uuid,
        text: &str,
    ) -> Result<CommentAppend, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation("Comment cannot be empty".into()));
        }

        // Built once so the id and timestamp are stable across write retries.
        let comment = Comment::new(author, author_id, text.to_string());

        let appended = comment.clone();
        let post = self
            .mutate_post(post_id, move |post| {
                post.push_comment(appended.clone());
            })
            .await?;

        // Second, independent write. No rollback path exists if it fails.
        match self.users.increment_comment_count(author_id).await {
            Ok(()) => Ok(CommentAppend::Committed { post, comment }),
            Err(e) => {
                tracing::warn!(
                    post_id = %post_id,
                    author_id = %author_id,
                    error = %e,
                    "Comment committed but counter update failed"
                );
                Ok(CommentAppend::PartialFailure {
                    post,
                    comment,
                    error: e.to_string(),
                })
            }
        }
    }

    /// Read-apply-replace loop with a bounded number of conditional-write
    /// attempts.
    async fn mutate_post<F>(&self, post_id: Uuid, apply: F) -> Result<Post, DomainError>
    where
        F: Fn(&mut Post),
    {
        for attempt in 1..=self.max_write_attempts {
            let mut post = self
                .posts
                .find_by_id(post_id)
                .await
                .map_err(store_failure)?
                .ok_or(DomainError::NotFound {
                    entity_type: "post",
                    id: post_id,
                })?;

            let expected = post.revision;
            apply(&mut post);

            match self.posts.replace(&post, expected).await {
                Ok(stored) => return Ok(stored),
                Err(RepoError::Conflict) => {
                    tracing::debug!(
                        post_id = %post_id,
                        attempt,
                        "Concurrent write detected, retrying"
                    );
                }
                Err(e) => return Err(store_failure(e)),
            }
        }

        Err(DomainError::Conflict(format!(
            "post {post_id} kept changing under us"
        )))
    }
}

fn store_failure(err: RepoError) -> DomainError {
    match err {
        RepoError::Conflict => DomainError::Conflict("conditional write lost".into()),
        other => DomainError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use super::*;
    use crate::domain::UserProfile;

    /// Store double with real conditional-replace semantics.
    #[derive(Default)]
    struct MemPosts {
        posts: Mutex<HashMap<Uuid, Post>>,
    }

    #[async_trait]
    impl PostRepository for MemPosts {
        async fn insert(&self, draft: PostDraft) -> Result<Post, RepoError> {
            let post = Post::from_draft(draft, Uuid::new_v4(), chrono::Utc::now());
            self.posts.lock().await.insert(post.id, post.clone());
            Ok(post)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(self.posts.lock().await.get(&id).cloned())
        }

        async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
            let mut all: Vec<Post> = self.posts.lock().await.values().cloned().collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(all)
        }

        async fn replace(&self, post: &Post, expected_revision: i64) -> Result<Post, RepoError> {
            let mut posts = self.posts.lock().await;
            let stored = posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
            if stored.revision != expected_revision {
                return Err(RepoError::Conflict);
            }
            let mut next = post.clone();
            next.revision = expected_revision + 1;
            *stored = next.clone();
            Ok(next)
        }
    }

    /// Delegating wrapper that loses the conditional write `conflicts` times
    /// before letting it through.
    struct ContendedPosts {
        inner: MemPosts,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl PostRepository for ContendedPosts {
        async fn insert(&self, draft: PostDraft) -> Result<Post, RepoError> {
            self.inner.insert(draft).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            self.inner.find_by_id(id).await
        }

        async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
            self.inner.list_newest_first().await
        }

        async fn replace(&self, post: &Post, expected_revision: i64) -> Result<Post, RepoError> {
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                return Err(RepoError::Conflict);
            }
            self.inner.replace(post, expected_revision).await
        }
    }

    #[derive(Default)]
    struct MemUsers {
        profiles: Mutex<HashMap<Uuid, UserProfile>>,
        fail_counter_writes: bool,
    }

    #[async_trait]
    impl UserRepository for MemUsers {
        async fn insert(&self, profile: UserProfile) -> Result<UserProfile, RepoError> {
            self.profiles
                .lock()
                .await
                .insert(profile.uid, profile.clone());
            Ok(profile)
        }

        async fn find_by_uid(&self, uid: Uuid) -> Result<Option<UserProfile>, RepoError> {
            Ok(self.profiles.lock().await.get(&uid).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepoError> {
            Ok(self
                .profiles
                .lock()
                .await
                .values()
                .find(|p| p.email.as_str() == email)
                .cloned())
        }

        async fn list_newest_first(&self) -> Result<Vec<UserProfile>, RepoError> {
            let mut all: Vec<UserProfile> =
                self.profiles.lock().await.values().cloned().collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(all)
        }

        async fn touch_last_seen(&self, uid: Uuid) -> Result<(), RepoError> {
            let mut profiles = self.profiles.lock().await;
            let profile = profiles.get_mut(&uid).ok_or(RepoError::NotFound)?;
            profile.last_seen = chrono::Utc::now();
            Ok(())
        }

        async fn increment_comment_count(&self, uid: Uuid) -> Result<(), RepoError> {
            if self.fail_counter_writes {
                return Err(RepoError::Connection("users store unreachable".into()));
            }
            let mut profiles = self.profiles.lock().await;
            let profile = profiles.get_mut(&uid).ok_or(RepoError::NotFound)?;
            profile.comment_count += 1;
            Ok(())
        }
    }

    fn service_with(posts: Arc<dyn PostRepository>, users: Arc<MemUsers>) -> ForumService {
        ForumService::new(posts, users)
    }

    async fn seeded_profile(users: &MemUsers) -> UserProfile {
        let profile = UserProfile::new(Identity::from("bob@x.com"), "hash".into());
        users.insert(profile.clone()).await.unwrap();
        profile
    }

    #[tokio::test]
    async fn create_post_rejects_blank_title() {
        let posts = Arc::new(MemPosts::default());
        let service = service_with(posts.clone(), Arc::new(MemUsers::default()));

        let err = service
            .create_post(Identity::from("a@x.com"), Uuid::new_v4(), "   ", "body")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(posts.list_newest_first().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_post_starts_with_empty_vote_state() {
        let service = service_with(
            Arc::new(MemPosts::default()),
            Arc::new(MemUsers::default()),
        );

        let post = service
            .create_post(
                Identity::from("a@x.com"),
                Uuid::new_v4(),
                "  Title  ",
                "  Body  ",
            )
            .await
            .unwrap();

        assert_eq!(post.title, "Title");
        assert_eq!(post.content, "Body");
        assert_eq!(post.upvotes, 0);
        assert!(post.upvoted_by.is_empty());
        assert!(post.downvoted_by.is_empty());
        assert!(post.comments.is_empty());
    }

    #[tokio::test]
    async fn vote_on_unknown_post_is_not_found() {
        let service = service_with(
            Arc::new(MemPosts::default()),
            Arc::new(MemUsers::default()),
        );

        let err = service
            .vote(Uuid::new_v4(), &Identity::from("b@x.com"), VoteIntent::Upvote)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn vote_persists_through_the_store() {
        let posts = Arc::new(MemPosts::default());
        let service = service_with(posts.clone(), Arc::new(MemUsers::default()));
        let bob = Identity::from("bob@x.com");

        let post = service
            .create_post(Identity::from("a@x.com"), Uuid::new_v4(), "t", "c")
            .await
            .unwrap();

        let stored = service.vote(post.id, &bob, VoteIntent::Upvote).await.unwrap();
        assert_eq!(stored.upvotes, 1);
        assert!(stored.upvoted_by.contains(&bob));

        let stored = service.vote(post.id, &bob, VoteIntent::Downvote).await.unwrap();
        assert_eq!(stored.upvotes, 0);
        assert_eq!(stored.downvotes, 1);
        assert!(stored.downvoted_by.contains(&bob));
        // Reload to make sure the aggregate was actually replaced.
        let reread = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(reread, stored);
    }

    #[tokio::test]
    async fn vote_retries_past_a_lost_conditional_write() {
        let posts = Arc::new(ContendedPosts {
            inner: MemPosts::default(),
            conflicts: AtomicU32::new(1),
        });
        let service = service_with(posts.clone(), Arc::new(MemUsers::default()));

        let post = service
            .create_post(Identity::from("a@x.com"), Uuid::new_v4(), "t", "c")
            .await
            .unwrap();

        let stored = service
            .vote(post.id, &Identity::from("b@x.com"), VoteIntent::Upvote)
            .await
            .unwrap();

        assert_eq!(stored.upvotes, 1);
    }

    #[tokio::test]
    async fn vote_surfaces_conflict_when_retries_run_out() {
        let posts = Arc::new(ContendedPosts {
            inner: MemPosts::default(),
            conflicts: AtomicU32::new(u32::MAX),
        });
        let service =
            service_with(posts.clone(), Arc::new(MemUsers::default())).with_write_attempts(2);

        let post = service
            .create_post(Identity::from("a@x.com"), Uuid::new_v4(), "t", "c")
            .await
            .unwrap();

        let err = service
            .vote(post.id, &Identity::from("b@x.com"), VoteIntent::Upvote)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_votes_are_both_kept() {
        let posts = Arc::new(MemPosts::default());
        let users = Arc::new(MemUsers::default());
        let service = Arc::new(service_with(posts.clone(), users));

        let post = service
            .create_post(Identity::from("a@x.com"), Uuid::new_v4(), "t", "c")
            .await
            .unwrap();

        let s1 = service.clone();
        let s2 = service.clone();
        let id = post.id;
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move {
                s1.vote(id, &Identity::from("alice@x.com"), VoteIntent::Upvote)
                    .await
            }),
            tokio::spawn(async move {
                s2.vote(id, &Identity::from("bob@x.com"), VoteIntent::Upvote)
                    .await
            }),
        );
        r1.unwrap().unwrap();
        r2.unwrap().unwrap();

        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.upvotes, 2, "a concurrent vote was lost");
        assert!(stored.upvoted_by.contains(&Identity::from("alice@x.com")));
        assert!(stored.upvoted_by.contains(&Identity::from("bob@x.com")));
    }

    #[tokio::test]
    async fn blank_comment_is_rejected_without_writing() {
        let posts = Arc::new(MemPosts::default());
        let users = Arc::new(MemUsers::default());
        let service = service_with(posts.clone(), users.clone());
        let author = seeded_profile(&users).await;

        let post = service
            .create_post(Identity::from("a@x.com"), Uuid::new_v4(), "t", "c")
            .await
            .unwrap();

        let err = service
            .add_comment(post.id, author.email.clone(), author.uid, "   \n  ")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert!(stored.comments.is_empty());
        let profile = users.find_by_uid(author.uid).await.unwrap().unwrap();
        assert_eq!(profile.comment_count, 0);
    }

    #[tokio::test]
    async fn comment_appends_and_bumps_lifetime_counter() {
        let posts = Arc::new(MemPosts::default());
        let users = Arc::new(MemUsers::default());
        let service = service_with(posts.clone(), users.clone());
        let author = seeded_profile(&users).await;

        let post = service
            .create_post(Identity::from("a@x.com"), Uuid::new_v4(), "t", "c")
            .await
            .unwrap();

        let outcome = service
            .add_comment(post.id, author.email.clone(), author.uid, "  nice post  ")
            .await
            .unwrap();

        let CommentAppend::Committed { post: stored, comment } = outcome else {
            panic!("expected a fully committed append");
        };
        assert_eq!(comment.content, "nice post");
        assert_eq!(stored.comment_count(), 1);
        assert_eq!(stored.comments[0], comment);

        let profile = users.find_by_uid(author.uid).await.unwrap().unwrap();
        assert_eq!(profile.comment_count, 1);
    }

    #[tokio::test]
    async fn counter_write_failure_is_a_partial_failure_not_a_rollback() {
        let posts = Arc::new(MemPosts::default());
        let users = Arc::new(MemUsers {
            fail_counter_writes: true,
            ..Default::default()
        });
        let service = service_with(posts.clone(), users.clone());
        let author = seeded_profile(&users).await;

        let post = service
            .create_post(Identity::from("a@x.com"), Uuid::new_v4(), "t", "c")
            .await
            .unwrap();

        let outcome = service
            .add_comment(post.id, author.email.clone(), author.uid, "hello")
            .await
            .unwrap();

        let CommentAppend::PartialFailure { comment, error, .. } = outcome else {
            panic!("expected the counter failure to surface");
        };
        assert!(!error.is_empty());

        // The append itself committed and stays committed.
        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.comments, vec![comment]);
    }

    #[tokio::test]
    async fn comment_order_is_insertion_order() {
        let posts = Arc::new(MemPosts::default());
        let users = Arc::new(MemUsers::default());
        let service = service_with(posts.clone(), users.clone());
        let author = seeded_profile(&users).await;

        let post = service
            .create_post(Identity::from("a@x.com"), Uuid::new_v4(), "t", "c")
            .await
            .unwrap();

        for text in ["first", "second", "third"] {
            service
                .add_comment(post.id, author.email.clone(), author.uid, text)
                .await
                .unwrap();
        }

        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        let contents: Vec<&str> = stored.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }
}
