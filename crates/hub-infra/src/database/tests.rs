#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    use hub_core::domain::{Identity, Post};
    use hub_core::error::RepoError;
    use hub_core::ports::{PostRepository, UserRepository};

    use crate::database::entity::post;
    use crate::database::postgres::{PostgresPostRepository, PostgresUserRepository};

    fn stored_post_model(id: uuid::Uuid, revision: i64) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id,
            title: "Test Post".to_owned(),
            content: "Content".to_owned(),
            author: "alice@x.com".to_owned(),
            author_id: uuid::Uuid::new_v4(),
            created_at: now.into(),
            upvotes: 1,
            downvotes: 0,
            upvoted_by: json!(["bob@x.com"]),
            downvoted_by: json!([]),
            comments: json!([]),
            revision,
        }
    }

    #[tokio::test]
    async fn find_post_decodes_the_stored_document() {
        let post_id = uuid::Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored_post_model(post_id, 3)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, post_id);
        assert_eq!(post.revision, 3);
        assert!(post.upvoted_by.contains(&Identity::from("bob@x.com")));
        assert_eq!(post.upvotes as usize, post.upvoted_by.len());
    }

    #[tokio::test]
    async fn replace_with_matching_revision_bumps_it() {
        let post_id = uuid::Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored_post_model(post_id, 0)]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let post = repo.find_by_id(post_id).await.unwrap().unwrap();

        let stored = repo.replace(&post, 0).await.unwrap();

        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn replace_with_stale_revision_is_a_conflict() {
        let post_id = uuid::Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored_post_model(post_id, 0)]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let post = repo.find_by_id(post_id).await.unwrap().unwrap();

        let err = repo.replace(&post, 0).await.unwrap_err();

        assert!(matches!(err, RepoError::Conflict));
    }

    #[tokio::test]
    async fn counter_bump_for_missing_profile_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let err = repo
            .increment_comment_count(uuid::Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::NotFound));
    }
}
