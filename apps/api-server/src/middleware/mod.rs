//! Middleware modules.

pub mod error;

#[cfg(feature = "auth")]
pub mod auth;
