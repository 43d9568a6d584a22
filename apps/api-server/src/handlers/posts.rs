//! Post listing, permalink resolution and comment submission.

use actix_web::{HttpResponse, web};

use blog_core::domain::{Comment, Permalink, Post, Tag};
use blog_core::ports::BaseRepository;
use blog_shared::dto::{
    CommentResponse, NewCommentRequest, PostDetail, PostListQuery, PostListResponse, PostSummary,
    TagResponse,
};

use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;

/// Words kept in a listing excerpt.
const EXCERPT_WORDS: usize = 30;

type PermalinkPath = web::Path<(i32, u32, u32, String)>;

fn excerpt(body: &str) -> String {
    let mut words = body.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(EXCERPT_WORDS).collect();
    let mut text = kept.join(" ");
    if words.next().is_some() {
        text.push_str(" ...");
    }
    text
}

fn summary(post: Post) -> PostSummary {
    PostSummary {
        permalink: post.permalink().path(),
        excerpt: excerpt(&post.body),
        id: post.id,
        title: post.title,
        slug: post.slug,
        author_id: post.author_id,
        publish: post.publish,
    }
}

fn tag_response(tag: Tag) -> TagResponse {
    TagResponse {
        name: tag.name,
        slug: tag.slug,
    }
}

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        name: comment.name,
        body: comment.body,
        created_at: comment.created_at,
    }
}

/// The published post at a permalink. Impossible dates and malformed slugs
/// are reported the same way as a missing post.
async fn resolve(
    state: &AppState,
    (year, month, day, slug): (i32, u32, u32, String),
) -> AppResult<Post> {
    let permalink = Permalink::new(year, month, day, slug)
        .map_err(|_| AppError::NotFound("No post at this address".to_string()))?;

    state
        .posts
        .find_published_by_permalink(&permalink)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No published post at {permalink}")))
}

/// GET /api/posts?tag=&page=
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    let tag = match query.tag.as_deref() {
        Some(slug) => Some(
            state
                .tags
                .find_by_slug(slug)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("No tag '{slug}'")))?,
        ),
        None => None,
    };
    let tag_slug = tag.as_ref().map(|t| t.slug.as_str());

    // Pages past the end come back as the last page.
    let requested = query.page.unwrap_or(1).max(1) - 1;
    let page = state
        .posts
        .published_page(tag_slug, requested, state.posts_per_page)
        .await?;

    let response = PostListResponse {
        page: page.page + 1,
        total_pages: page.total_pages,
        total_posts: page.total_items,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        tag: tag.map(tag_response),
        posts: page.items.into_iter().map(summary).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/posts/{year}/{month}/{day}/{slug}
pub async fn post_detail(
    state: web::Data<AppState>,
    path: PermalinkPath,
) -> AppResult<HttpResponse> {
    let post = resolve(&state, path.into_inner()).await?;

    let tags = state.tags.tags_for_post(post.id).await?;
    let comments = state.comments.active_for_post(post.id).await?;

    let detail = PostDetail {
        permalink: post.permalink().path(),
        id: post.id,
        title: post.title,
        slug: post.slug,
        author_id: post.author_id,
        body: post.body,
        publish: post.publish,
        updated_at: post.updated_at,
        tags: tags.into_iter().map(tag_response).collect(),
        comments: comments.into_iter().map(comment_response).collect(),
    };

    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/posts/{year}/{month}/{day}/{slug}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    path: PermalinkPath,
    body: web::Json<NewCommentRequest>,
    request_id: RequestId,
) -> AppResult<HttpResponse> {
    let post = resolve(&state, path.into_inner()).await?;
    let req = body.into_inner();

    let comment = Comment::new(
        post.id,
        req.name.trim().to_string(),
        req.email.trim().to_string(),
        req.body,
    );

    let saved = state.comments.insert(comment).await?;
    tracing::info!(
        request_id = request_id.as_str(),
        post_id = %post.id,
        comment_id = %saved.id,
        "Comment added"
    );

    Ok(HttpResponse::Created().json(comment_response(saved)))
}

/// GET /api/authors/{username}/posts
pub async fn author_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No author '{username}'")))?;

    let posts: Vec<PostSummary> = state
        .posts
        .find_by_author(author.id)
        .await?
        .into_iter()
        .filter(Post::is_published)
        .map(summary)
        .collect();

    Ok(HttpResponse::Ok().json(posts))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    use blog_core::domain::{PostStatus, User};
    use blog_infra::InMemoryBlogStore;

    use super::*;
    use crate::handlers::configure_routes;

    async fn seeded() -> (AppState, Post) {
        let store = InMemoryBlogStore::new();
        let state = AppState::in_memory(store, 2);

        let author = state
            .users
            .insert(User::new("admin".to_string(), "admin@example.com".to_string()))
            .await
            .unwrap();

        let mut first = None;
        for (day, status) in [
            (1, PostStatus::Published),
            (2, PostStatus::Published),
            (3, PostStatus::Draft),
            (4, PostStatus::Published),
        ] {
            let post = Post::new(
                author.id,
                format!("Post {day}"),
                "hello-world".to_string(),
                "Some body text".to_string(),
            )
            .with_status(status)
            .with_publish(Utc.with_ymd_and_hms(2023, 5, day, 12, 0, 0).unwrap());
            let saved = state.posts.insert(post).await.unwrap();
            if first.is_none() {
                first = Some(saved);
            }
        }

        let first = first.unwrap();
        state
            .tags
            .set_post_tags(first.id, &["Rust".to_string()])
            .await
            .unwrap();

        (state, first)
    }

    #[actix_web::test]
    async fn test_list_posts_paginates_published() {
        let (state, _) = seeded().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_posts"], 3);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["page"], 1);
        assert_eq!(body["posts"][0]["permalink"], "/2023/5/4/hello-world/");
        assert_eq!(body["posts"][1]["permalink"], "/2023/5/2/hello-world/");

        let req = test::TestRequest::get().uri("/api/posts?page=9").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["page"], 2);
        assert_eq!(body["posts"][0]["permalink"], "/2023/5/1/hello-world/");

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts?page={}", u64::MAX))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["page"], 2);
        assert_eq!(body["has_next"], false);

        let req = test::TestRequest::get().uri("/api/posts?tag=rust").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_posts"], 1);
        assert_eq!(body["tag"]["name"], "Rust");

        let req = test::TestRequest::get().uri("/api/posts?tag=missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_post_detail_resolves_permalink() {
        let (state, first) = seeded().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/posts/2023/5/1/hello-world")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], first.id.to_string());
        assert_eq!(body["tags"][0]["slug"], "rust");

        // Drafts and impossible dates are not addressable.
        for uri in [
            "/api/posts/2023/5/3/hello-world",
            "/api/posts/2023/2/30/hello-world",
            "/api/posts/2023/5/1/other",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_web::test]
    async fn test_add_comment_then_see_it_on_detail() {
        let (state, _) = seeded().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/posts/2023/5/1/hello-world/comments")
            .set_json(json!({
                "name": "Reader",
                "email": "reader@example.com",
                "body": "Great read"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/posts/2023/5/1/hello-world")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["comments"][0]["name"], "Reader");
        assert!(body["comments"][0].get("email").is_none());
    }

    #[actix_web::test]
    async fn test_add_comment_rejects_invalid_input() {
        let (state, _) = seeded().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/posts/2023/5/1/hello-world/comments")
            .set_json(json!({ "name": "", "email": "nope", "body": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn test_author_posts_lists_only_published() {
        let (state, _) = seeded().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/authors/admin/posts")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().map(Vec::len), Some(3));

        let req = test::TestRequest::get()
            .uri("/api/authors/nobody/posts")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[cfg(test)]
mod excerpt_tests {
    use super::{EXCERPT_WORDS, excerpt};

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let long = "word ".repeat(40);
        let short = excerpt(&long);
        assert_eq!(short.split_whitespace().count(), EXCERPT_WORDS + 1);
        assert!(short.ends_with(" ..."));
        assert_eq!(excerpt("two words"), "two words");
    }
}
