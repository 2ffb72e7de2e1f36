//! HTTP handlers and route configuration.

#[cfg(feature = "auth")]
mod auth;
mod health;
mod posts;
mod users;

use std::future::Future;
use std::time::Duration;

use actix_web::web;

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let api = web::scope("/api")
        // Public routes
        .route("/health", web::get().to(health::health_check))
        .route("/posts", web::get().to(posts::list_posts))
        .route("/users", web::get().to(users::list_users));

    // Routes that need an authenticated identity
    #[cfg(feature = "auth")]
    let api = api
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .route("/me", web::get().to(auth::me)),
        )
        .route("/posts", web::post().to(posts::create_post))
        .route("/posts/{id}/votes", web::post().to(posts::vote))
        .route("/posts/{id}/comments", web::post().to(posts::add_comment));

    cfg.service(api);
}

/// Run a store-touching future under the configured timeout. An elapsed
/// timeout drops (cancels) the operation and reports the backend unavailable.
pub(crate) async fn bounded<T, E>(
    limit: Duration,
    fut: impl Future<Output = Result<T, E>>,
) -> AppResult<T>
where
    AppError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::ServiceUnavailable(
            "store operation timed out".to_string(),
        )),
    }
}
