//! HTTP handlers and route configuration.

mod auth;
mod health;
mod likes;
mod pages;
mod posts;

use std::sync::Arc;

use actix_web::web;
use folio_core::ports::RateLimiter;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// Fixed segments under `/posts` are registered before `/{param}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, like_limiter: Arc<dyn RateLimiter>) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("invalid JSON body: {err}")).into()
    }))
    .route("/access-denied", web::get().to(pages::access_denied))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/signin", web::get().to(auth::signin))
                    .route("/callback", web::get().to(auth::callback))
                    .route("/signout", web::post().to(auth::signout))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create))
                    .route("", web::get().to(posts::list_published))
                    .route("/mine", web::get().to(posts::list_mine))
                    .route("/pending", web::get().to(posts::pending))
                    .route("/stats", web::get().to(posts::stats))
                    .route("/approve/{id}", web::post().to(posts::approve))
                    .route("/reject/{id}", web::post().to(posts::reject))
                    .route("/needs-update/{id}", web::post().to(posts::needs_update))
                    .route("/edits/{id}", web::patch().to(posts::edit))
                    .route("/{param}/submit", web::post().to(posts::submit))
                    .service(
                        web::resource("/{param}/likes")
                            .wrap(RateLimitMiddleware::new(like_limiter))
                            .route(web::get().to(likes::status))
                            .route(web::post().to(likes::toggle)),
                    )
                    .service(
                        web::resource("/{param}")
                            .route(web::get().to(posts::get))
                            .route(web::put().to(posts::update))
                            .route(web::delete().to(posts::delete)),
                    ),
            ),
    );
}
