//! Post entity for SeaORM.
//!
//! The row is document-shaped: vote sets and the comment log live in JSONB
//! columns and are read and written as part of the whole aggregate. The
//! `revision` column backs the conditional replace.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use hub_core::domain::{Comment, Identity, Post};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author: String,
    pub author_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub upvotes: i32,
    pub downvotes: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub upvoted_by: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub downvoted_by: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub comments: Json,
    pub revision: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to the domain aggregate. Fallible: the JSON
/// columns have to decode into vote sets and comments.
impl TryFrom<Model> for Post {
    type Error = serde_json::Error;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            title: model.title,
            content: model.content,
            author: Identity::from(model.author),
            author_id: model.author_id,
            created_at: model.created_at.into(),
            upvotes: model.upvotes.max(0) as u32,
            downvotes: model.downvotes.max(0) as u32,
            upvoted_by: serde_json::from_value(model.upvoted_by)?,
            downvoted_by: serde_json::from_value(model.downvoted_by)?,
            comments: serde_json::from_value::<Vec<Comment>>(model.comments)?,
            revision: model.revision,
        })
    }
}

impl ActiveModel {
    /// Build an active model carrying the full aggregate state.
    pub fn try_from_domain(post: &Post) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Set(post.id),
            title: Set(post.title.clone()),
            content: Set(post.content.clone()),
            author: Set(post.author.as_str().to_string()),
            author_id: Set(post.author_id),
            created_at: Set(post.created_at.into()),
            upvotes: Set(post.upvotes as i32),
            downvotes: Set(post.downvotes as i32),
            upvoted_by: Set(serde_json::to_value(&post.upvoted_by)?),
            downvoted_by: Set(serde_json::to_value(&post.downvoted_by)?),
            comments: Set(serde_json::to_value(&post.comments)?),
            revision: Set(post.revision),
        })
    }
}
