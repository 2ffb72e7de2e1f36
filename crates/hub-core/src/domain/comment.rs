use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Identity;

/// A single comment on a post.
///
/// Comments are append-only: once attached to a post they are never edited,
/// deleted, or reordered. Ids are random rather than clock-derived so that
/// concurrent submissions cannot collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub author: Identity,
    pub author_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment. `content` is expected to be pre-validated
    /// (non-empty after trimming) by the caller.
    pub fn new(author: Identity, author_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            author,
            author_id,
            timestamp: Utc::now(),
        }
    }
}
