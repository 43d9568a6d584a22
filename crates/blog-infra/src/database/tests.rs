#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait, Value};
    use uuid::Uuid;

    use crate::database::entity::{comment, post, tag};
    use crate::database::postgres_repo::{
        PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    };
    use blog_core::domain::{Comment, Permalink, Post, PostStatus};
    use blog_core::error::RepoError;
    use blog_core::ports::{BaseRepository, CommentRepository, PostRepository, TagRepository};

    fn post_model(slug: &str, status: post::Status) -> post::Model {
        let publish = Utc.with_ymd_and_hms(2023, 5, 1, 10, 0, 0).unwrap();
        post::Model {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "Hello World".to_owned(),
            slug: slug.to_owned(),
            body: "Content".to_owned(),
            publish: publish.into(),
            status,
            created_at: publish.into(),
            updated_at: publish.into(),
        }
    }

    fn comment_model(post_id: Uuid) -> comment::Model {
        let now = Utc::now();
        comment::Model {
            id: Uuid::new_v4(),
            post_id,
            name: "Reader".to_owned(),
            email: "reader@example.com".to_owned(),
            body: "Nice".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let model = post_model("hello-world", post::Status::Published);
        let post_id = model.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.expect("post should be found");
        assert_eq!(post.title, "Hello World");
        assert_eq!(post.id, post_id);
        assert_eq!(post.status, PostStatus::Published);
    }

    #[test]
    fn test_published_listing_filters_status_and_orders_by_publish() {
        let stmt = post::Entity::find_published().build(DatabaseBackend::Postgres);
        assert!(stmt.sql.contains(r#"WHERE "post"."status" = $1"#));
        assert!(stmt.sql.ends_with(r#"ORDER BY "post"."publish" DESC"#));
        assert_eq!(stmt.values.unwrap().0, vec![Value::from("published")]);

        let stmt = post::Entity::find_drafts().build(DatabaseBackend::Postgres);
        assert_eq!(stmt.values.unwrap().0, vec![Value::from("draft")]);
    }

    #[test]
    fn test_comment_listing_orders_oldest_first() {
        let stmt = comment::Entity::find_active_for_post(Uuid::new_v4())
            .build(DatabaseBackend::Postgres);
        assert!(stmt.sql.contains(r#""comments"."post_id" = $1"#));
        assert!(stmt.sql.contains(r#""comments"."active" = $2"#));
        assert!(stmt.sql.ends_with(r#"ORDER BY "comments"."created_at" ASC"#));
    }

    #[tokio::test]
    async fn test_published_returns_only_published_rows() {
        let newer = post_model("newer", post::Status::Published);
        let older = post_model("older", post::Status::Published);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![newer.clone(), older.clone()]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let posts = repo.published().await.unwrap();

        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older"]);
        assert!(posts.iter().all(Post::is_published));
    }

    #[tokio::test]
    async fn test_insert_post_checks_slug_then_inserts() {
        let model = post_model("hello-world", post::Status::Draft);
        let post: Post = model.clone().into();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new(), vec![model]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let saved = repo.insert(post).await.unwrap();
        assert_eq!(saved.slug, "hello-world");
        assert_eq!(saved.status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_insert_post_with_taken_slug_is_constraint_violation() {
        let existing = post_model("hello-world", post::Status::Published);
        let clash: Post = post_model("hello-world", post::Status::Draft).into();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let err = repo.insert(clash).await.unwrap_err();

        match err {
            RepoError::Constraint(msg) => {
                assert!(msg.contains("hello-world"));
                assert!(msg.contains("2023-05-01"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_published_by_permalink() {
        let model = post_model("hello-world", post::Status::Published);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let link = Permalink::new(2023, 5, 1, "hello-world").unwrap();
        let post = repo.find_published_by_permalink(&link).await.unwrap().unwrap();

        assert_eq!(post.id, model.id);
        assert_eq!(post.permalink(), link);
    }

    #[tokio::test]
    async fn test_delete_post_reports_missing_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let id = Uuid::new_v4();

        assert!(BaseRepository::<Post, Uuid>::delete(&repo, id).await.is_ok());
        assert!(matches!(
            BaseRepository::<Post, Uuid>::delete(&repo, id).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_insert_comment_returns_active_comment() {
        let post_id = Uuid::new_v4();
        let model = comment_model(post_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let repo = PostgresCommentRepository::new(db);
        let comment = Comment::new(
            post_id,
            model.name.clone(),
            model.email.clone(),
            model.body.clone(),
        );
        let saved = repo.insert(comment).await.unwrap();

        assert!(saved.active);
        assert_eq!(saved.post_id, post_id);
    }

    #[tokio::test]
    async fn test_active_comments_for_post() {
        let post_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![comment_model(post_id), comment_model(post_id)]])
            .into_connection();

        let repo = PostgresCommentRepository::new(db);
        let comments = repo.active_for_post(post_id).await.unwrap();

        assert_eq!(comments.len(), 2);
        assert!(comments.iter().all(|c| c.active && c.post_id == post_id));
    }

    #[tokio::test]
    async fn test_set_post_tags_creates_missing_tag() {
        let post_id = Uuid::new_v4();
        let created = tag::Model {
            id: Uuid::new_v4(),
            name: "Rust".to_owned(),
            slug: "rust".to_owned(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<tag::Model>::new(), vec![created.clone()]])
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let repo = PostgresTagRepository::new(db);
        let tags = repo
            .set_post_tags(post_id, &["Rust".to_string(), "rust".to_string()])
            .await
            .unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, created.id);
        assert_eq!(tags[0].slug, "rust");
    }

    #[tokio::test]
    async fn test_invalid_post_rejected_before_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PostgresPostRepository::new(db);

        let post = Post::new(
            Uuid::new_v4(),
            "x".repeat(500),
            "bad slug!".to_string(),
            "Content".to_string(),
        );
        let err = repo.insert(post).await.unwrap_err();

        match err {
            RepoError::Validation(msg) => {
                assert!(msg.contains("title"));
                assert!(msg.contains("slug"));
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_published_page_clamps_to_last_page() {
        let count = BTreeMap::from([("num_items", Value::BigInt(Some(1)))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![count]])
            .append_query_results(vec![vec![post_model(
                "hello-world",
                post::Status::Published,
            )]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let page = repo.published_page(None, u64::MAX, 3).await.unwrap();

        assert_eq!(page.page, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].slug, "hello-world");
    }
}
