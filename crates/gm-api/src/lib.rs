//! # gm-api
//!
//! The web routing and orchestration layer for GameMe.

pub mod handlers;
pub mod middleware;

use actix_web::web;

pub use handlers::AppState;

/// Configures the routes for the forum.
///
/// # Developer Note
/// We use a scoped configuration so the binary can mount the app under a
/// prefix if it ever needs to share a host.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            // The home feed (e.g., /?mode=top)
            .route("/", web::get().to(handlers::index))
            .route("/healthz", web::get().to(handlers::health))
            // Feed actions
            .route("/posts/{id}/like", web::post().to(handlers::like_post))
            .service(
                web::resource("/posts/{id}/delete")
                    .route(web::get().to(handlers::confirm_delete))
                    .route(web::post().to(handlers::delete_post)),
            )
            // The single post page and its actions
            .route("/post/{id}", web::get().to(handlers::view_post))
            .route("/post/{id}/like", web::post().to(handlers::like_from_page))
            .route("/post/{id}/comments", web::post().to(handlers::add_comment))
            // The upload flow
            .service(
                web::resource("/upload")
                    .route(web::get().to(handlers::upload_form))
                    .route(web::post().to(handlers::submit_upload)),
            ),
    );
}
