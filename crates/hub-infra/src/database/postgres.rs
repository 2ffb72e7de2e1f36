//! Postgres repository implementations.
//!
//! Posts are written whole-aggregate. [`PostgresPostRepository::replace`] is
//! the conditional write: an `UPDATE` filtered on both id and the expected
//! revision, where zero affected rows means the aggregate moved underneath
//! the caller.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, NotSet, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use hub_core::domain::{Post, PostDraft, UserProfile};
use hub_core::error::RepoError;
use hub_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

/// Postgres post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Postgres user profile repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn query_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

fn decode_err(e: serde_json::Error) -> RepoError {
    RepoError::Query(format!("stored document does not decode: {e}"))
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, draft: PostDraft) -> Result<Post, RepoError> {
        // Id and creation time are assigned here, at the persistence
        // boundary, so clients cannot skew the listing order.
        let post = Post::from_draft(draft, Uuid::new_v4(), Utc::now());

        let model = post::ActiveModel::try_from_domain(&post).map_err(decode_err)?;
        model.insert(&self.db).await.map_err(query_err)?;

        tracing::debug!(post_id = %post.id, "Post inserted");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        result.map(Post::try_from).transpose().map_err(decode_err)
    }

    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        rows.into_iter()
            .map(|m| Post::try_from(m).map_err(decode_err))
            .collect()
    }

    async fn replace(&self, post: &Post, expected_revision: i64) -> Result<Post, RepoError> {
        let mut next = post.clone();
        next.revision = expected_revision + 1;

        let mut model = post::ActiveModel::try_from_domain(&next).map_err(decode_err)?;
        model.id = NotSet;

        let result = PostEntity::update_many()
            .set(model)
            .filter(post::Column::Id.eq(post.id))
            .filter(post::Column::Revision.eq(expected_revision))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            // Row gone or revision moved; either way the caller must re-read.
            return Err(RepoError::Conflict);
        }

        Ok(next)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, profile: UserProfile) -> Result<UserProfile, RepoError> {
        let model: user::ActiveModel = profile.clone().into();
        model.insert(&self.db).await.map_err(query_err)?;
        Ok(profile)
    }

    async fn find_by_uid(&self, uid: Uuid) -> Result<Option<UserProfile>, RepoError> {
        let result = UserEntity::find_by_id(uid)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_newest_first(&self) -> Result<Vec<UserProfile>, RepoError> {
        let rows = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn touch_last_seen(&self, uid: Uuid) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::LastSeen, Expr::value(Utc::now()))
            .filter(user::Column::Uid.eq(uid))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn increment_comment_count(&self, uid: Uuid) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(
                user::Column::CommentCount,
                Expr::col(user::Column::CommentCount).add(1),
            )
            .filter(user::Column::Uid.eq(uid))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
