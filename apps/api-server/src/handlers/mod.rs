//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route(
                "/authors/{username}/posts",
                web::get().to(posts::author_posts),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route(
                        "/{year}/{month}/{day}/{slug}",
                        web::get().to(posts::post_detail),
                    )
                    .route(
                        "/{year}/{month}/{day}/{slug}/comments",
                        web::post().to(posts::add_comment),
                    ),
            ),
    );
}
