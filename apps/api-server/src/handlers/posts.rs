//! Post handlers: listing, creation, voting and commenting.

use actix_web::{HttpResponse, web};

use hub_core::domain::{Comment, Post};
use hub_shared::ApiResponse;
use hub_shared::dto::{CommentResponse, PostResponse};

use super::bounded;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[cfg(feature = "auth")]
use hub_core::domain::VoteIntent;
#[cfg(feature = "auth")]
use hub_core::service::CommentAppend;
#[cfg(feature = "auth")]
use hub_shared::dto::{CommentRequest, CreatePostRequest, VoteDirection, VoteRequest};

#[cfg(feature = "auth")]
use crate::middleware::auth::CurrentUser;

const LISTING_CACHE_KEY: &str = "posts:listing";

/// GET /api/posts
///
/// Newest first. Served from the listing cache when fresh; every mutating
/// handler below invalidates it.
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    if let Some(cached) = state.cache.get(LISTING_CACHE_KEY).await {
        return Ok(HttpResponse::Ok()
            .content_type("application/json")
            .body(cached));
    }

    let posts = bounded(state.op_timeout, state.forum.list_posts()).await?;
    let listing: Vec<PostResponse> = posts.iter().map(to_post_response).collect();

    let body = serde_json::to_string(&ApiResponse::ok(listing))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if let Err(e) = state
        .cache
        .put(LISTING_CACHE_KEY, &body, state.listing_ttl)
        .await
    {
        tracing::warn!("Failed to cache post listing: {}", e);
    }

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

/// POST /api/posts
#[cfg(feature = "auth")]
pub async fn create_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = bounded(
        state.op_timeout,
        state
            .forum
            .create_post(user.identity(), user.user_id, &req.title, &req.content),
    )
    .await?;

    drop_listing_cache(&state).await;

    Ok(HttpResponse::Created().json(ApiResponse::ok(to_post_response(&post))))
}

/// POST /api/posts/{id}/votes
#[cfg(feature = "auth")]
pub async fn vote(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<uuid::Uuid>,
    body: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let intent = match body.into_inner().intent {
        VoteDirection::Upvote => VoteIntent::Upvote,
        VoteDirection::Downvote => VoteIntent::Downvote,
    };

    let post = bounded(
        state.op_timeout,
        state.forum.vote(post_id, &user.identity(), intent),
    )
    .await?;

    drop_listing_cache(&state).await;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(to_post_response(&post))))
}

/// POST /api/posts/{id}/comments
#[cfg(feature = "auth")]
pub async fn add_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<uuid::Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    let outcome = bounded(
        state.op_timeout,
        state
            .forum
            .add_comment(post_id, user.identity(), user.user_id, &req.content),
    )
    .await?;

    drop_listing_cache(&state).await;

    // The comment is committed in both arms; a failed counter write is
    // reported alongside it rather than masked or rolled back.
    let response = match outcome {
        CommentAppend::Committed { comment, .. } => {
            ApiResponse::ok(to_comment_response(&comment))
        }
        CommentAppend::PartialFailure { comment, error, .. } => ApiResponse::ok_with_message(
            to_comment_response(&comment),
            format!("comment stored, but the lifetime counter update failed: {error}"),
        ),
    };

    Ok(HttpResponse::Created().json(response))
}

#[cfg(feature = "auth")]
async fn drop_listing_cache(state: &AppState) {
    if let Err(e) = state.cache.invalidate(LISTING_CACHE_KEY).await {
        tracing::warn!("Failed to invalidate post listing cache: {}", e);
    }
}

fn to_post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        author: post.author.to_string(),
        author_id: post.author_id,
        created_at: post.created_at,
        upvotes: post.upvotes,
        downvotes: post.downvotes,
        upvoted_by: post.upvoted_by.iter().map(|i| i.to_string()).collect(),
        downvoted_by: post.downvoted_by.iter().map(|i| i.to_string()).collect(),
        comment_count: post.comment_count(),
        comments: post.comments.iter().map(to_comment_response).collect(),
    }
}

fn to_comment_response(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        content: comment.content.clone(),
        author: comment.author.to_string(),
        author_id: comment.author_id,
        timestamp: comment.timestamp,
    }
}
