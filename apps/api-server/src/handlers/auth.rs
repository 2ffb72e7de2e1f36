//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use hub_core::domain::{Identity, UserProfile};
use hub_core::ports::{PasswordService, TokenService};
use hub_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use super::bounded;
use crate::middleware::auth::CurrentUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    // Check if the email is already registered
    if bounded(state.op_timeout, state.users.find_by_email(&req.email))
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    // Hash password
    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Create the profile document with zeroed counters
    let profile = UserProfile::new(Identity::from(req.email.as_str()), password_hash);
    let saved = bounded(state.op_timeout, state.users.insert(profile)).await?;
    tracing::info!(uid = %saved.uid, "User registered");

    // Generate token
    let token = token_service
        .generate_token(saved.uid, saved.email.as_str())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Find the account
    let profile = bounded(state.op_timeout, state.users.find_by_email(&req.email))
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Verify password
    let valid = password_service
        .verify(&req.password, &profile.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    // Record the visit
    bounded(state.op_timeout, state.users.touch_last_seen(profile.uid)).await?;

    // Generate token
    let token = token_service
        .generate_token(profile.uid, profile.email.as_str())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, user: CurrentUser) -> AppResult<HttpResponse> {
    let profile = bounded(state.op_timeout, state.users.find_by_uid(user.user_id))
        .await?
        .ok_or_else(|| AppError::NotFound("profile not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        uid: profile.uid,
        email: profile.email.to_string(),
        created_at: profile.created_at,
    }))
}
