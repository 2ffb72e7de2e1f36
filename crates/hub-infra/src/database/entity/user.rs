//! User profile entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use hub_core::domain::{Identity, UserProfile};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub last_seen: DateTimeWithTimeZone,
    pub post_count: i32,
    pub comment_count: i32,
    pub upvotes_received: i32,
    pub downvotes_received: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to the domain profile.
impl From<Model> for UserProfile {
    fn from(model: Model) -> Self {
        Self {
            uid: model.uid,
            email: Identity::from(model.email),
            password_hash: model.password_hash,
            created_at: model.created_at.into(),
            last_seen: model.last_seen.into(),
            post_count: model.post_count.max(0) as u32,
            comment_count: model.comment_count.max(0) as u32,
            upvotes_received: model.upvotes_received.max(0) as u32,
            downvotes_received: model.downvotes_received.max(0) as u32,
        }
    }
}

/// Conversion from the domain profile to a SeaORM ActiveModel.
impl From<UserProfile> for ActiveModel {
    fn from(profile: UserProfile) -> Self {
        Self {
            uid: Set(profile.uid),
            email: Set(profile.email.as_str().to_string()),
            password_hash: Set(profile.password_hash),
            created_at: Set(profile.created_at.into()),
            last_seen: Set(profile.last_seen.into()),
            post_count: Set(profile.post_count as i32),
            comment_count: Set(profile.comment_count as i32),
            upvotes_received: Set(profile.upvotes_received as i32),
            downvotes_received: Set(profile.downvotes_received as i32),
        }
    }
}
