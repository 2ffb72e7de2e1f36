//! Adds the vote/comment state to posts created before voting shipped.
//!
//! Pre-existing rows get empty vote sets, zero counts, an empty comment log
//! and revision zero; every other column is left untouched. The trailing
//! UPDATE also normalizes rows where the columns were added by hand as
//! nullable, so re-running it against a half-migrated table is a no-op.

use sea_orm_migration::prelude::*;

use super::m20250412_000002_create_posts::Posts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Posts::Table)
                    .add_column_if_not_exists(
                        ColumnDef::new(VoteState::Upvotes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .add_column_if_not_exists(
                        ColumnDef::new(VoteState::Downvotes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .add_column_if_not_exists(
                        ColumnDef::new(VoteState::UpvotedBy)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .add_column_if_not_exists(
                        ColumnDef::new(VoteState::DownvotedBy)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .add_column_if_not_exists(
                        ColumnDef::new(VoteState::Comments)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .add_column_if_not_exists(
                        ColumnDef::new(VoteState::Revision)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                UPDATE posts SET upvoted_by = '[]'::jsonb WHERE upvoted_by IS NULL;
                UPDATE posts SET downvoted_by = '[]'::jsonb WHERE downvoted_by IS NULL;
                UPDATE posts SET comments = '[]'::jsonb WHERE comments IS NULL;
                UPDATE posts SET upvotes = 0 WHERE upvotes IS NULL;
                UPDATE posts SET downvotes = 0 WHERE downvotes IS NULL;
                UPDATE posts SET revision = 0 WHERE revision IS NULL;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Posts::Table)
                    .drop_column(VoteState::Upvotes)
                    .drop_column(VoteState::Downvotes)
                    .drop_column(VoteState::UpvotedBy)
                    .drop_column(VoteState::DownvotedBy)
                    .drop_column(VoteState::Comments)
                    .drop_column(VoteState::Revision)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum VoteState {
    Upvotes,
    Downvotes,
    UpvotedBy,
    DownvotedBy,
    Comments,
    Revision,
}
