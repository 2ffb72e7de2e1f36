//! Schema migrations for the CollegeHub store.

pub use sea_orm_migration::prelude::*;

mod m20250412_000001_create_users;
mod m20250412_000002_create_posts;
mod m20250802_000001_add_vote_state;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250412_000001_create_users::Migration),
            Box::new(m20250412_000002_create_posts::Migration),
            Box::new(m20250802_000001_add_vote_state::Migration),
        ]
    }
}
