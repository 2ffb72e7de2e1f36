//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub uid: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub uid: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub post_count: u32,
    pub comment_count: u32,
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// Vote direction on the wire. Deserialization is the validation boundary:
/// anything but "upvote"/"downvote" is rejected before a handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Upvote,
    Downvote,
}

/// Request to vote on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub intent: VoteDirection,
}

/// Request to append a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

/// A comment as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub author: String,
    pub author_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// A post as returned by the API, votes and comments included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub upvotes: u32,
    pub downvotes: u32,
    pub upvoted_by: Vec<String>,
    pub downvoted_by: Vec<String>,
    /// Per-post count, always `comments.len()`.
    pub comment_count: usize,
    pub comments: Vec<CommentResponse>,
}
