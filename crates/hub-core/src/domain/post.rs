use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Comment, Identity};

/// Post aggregate - a forum post together with its vote state and comments.
///
/// Two invariants hold at every observable point:
/// - an identity is a member of at most one of `upvoted_by` / `downvoted_by`;
/// - `upvotes` / `downvotes` always equal the cardinality of their set.
///
/// The counts are derived, never adjusted independently of the sets; see
/// [`Post::apply_vote`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Identity,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    #[serde(default)]
    pub upvoted_by: BTreeSet<Identity>,
    #[serde(default)]
    pub downvoted_by: BTreeSet<Identity>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Store revision used for conditional replacement. Bumped by the
    /// persistence layer on every successful write; not user-visible state.
    #[serde(default)]
    pub revision: i64,
}

/// A post as submitted by its author, before the persistence layer has
/// assigned an id and a creation timestamp.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub author: Identity,
    pub author_id: Uuid,
}

impl Post {
    /// Materialize a draft into a full aggregate. Called by repository
    /// adapters at insert time so that `created_at` comes from the
    /// persistence layer's clock rather than the client's.
    pub fn from_draft(draft: PostDraft, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            author: draft.author,
            author_id: draft.author_id,
            created_at,
            upvotes: 0,
            downvotes: 0,
            upvoted_by: BTreeSet::new(),
            downvoted_by: BTreeSet::new(),
            comments: Vec::new(),
            revision: 0,
        }
    }

    /// Append a comment. The comment log only ever grows; there is no
    /// removal or reordering path anywhere in the system.
    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}
