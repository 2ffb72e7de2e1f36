//! # Hub Core
//!
//! The domain layer of the CollegeHub forum backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the post/comment data model, the vote transition engine, the ports the
//! adapters implement, and the application services that orchestrate them.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
