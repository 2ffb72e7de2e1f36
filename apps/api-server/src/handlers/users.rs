//! User directory handler - backs the admin panel's user table.

use actix_web::{HttpResponse, web};

use hub_shared::ApiResponse;
use hub_shared::dto::DirectoryEntry;

use super::bounded;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users
///
/// All registered users, newest account first.
pub async fn list_users(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let profiles = bounded(state.op_timeout, state.users.list_newest_first()).await?;

    let entries: Vec<DirectoryEntry> = profiles
        .into_iter()
        .map(|p| DirectoryEntry {
            uid: p.uid,
            email: p.email.to_string(),
            created_at: p.created_at,
            last_seen: p.last_seen,
            post_count: p.post_count,
            comment_count: p.comment_count,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(entries)))
}
