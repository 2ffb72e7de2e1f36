//! SeaORM entities for the posts and users tables.

pub mod post;
pub mod user;
