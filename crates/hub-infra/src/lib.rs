//! # Hub Infrastructure
//!
//! Concrete implementations of the ports defined in `hub-core`.
//! This crate contains the Postgres store adapters, their in-memory
//! fallbacks, and the JWT/Argon2 auth services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - Postgres document store via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod cache;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::{InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{PostgresPostRepository, PostgresUserRepository};
