use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Identity;

/// Per-account profile document (`users/{uid}`).
///
/// `comment_count` is a denormalized lifetime statistic bumped by the comment
/// path; it is never used as a per-post comment count (that is always read
/// off the post aggregate). `post_count`, `upvotes_received` and
/// `downvotes_received` are written once at creation and have no other
/// writer here - they belong to an external aggregation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: Uuid,
    pub email: Identity,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub post_count: u32,
    pub comment_count: u32,
    pub upvotes_received: u32,
    pub downvotes_received: u32,
}

impl UserProfile {
    /// Create a fresh profile with zeroed counters.
    pub fn new(email: Identity, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            uid: Uuid::new_v4(),
            email,
            password_hash,
            created_at: now,
            last_seen: now,
            post_count: 0,
            comment_count: 0,
            upvotes_received: 0,
            downvotes_received: 0,
        }
    }
}
