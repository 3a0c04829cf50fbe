use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::Schemes;

pub mod auth;
pub mod blog;
pub mod comments;
pub mod system;

/// Full route table. Each protected method names its scheme explicitly;
/// anything not wrapped is public.
pub fn router(schemes: &Schemes) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", schemes.self_signed(get(auth::me)))
        .route("/api/protected", schemes.self_signed(get(system::protected)))
        .route("/api/oauth2-protected", schemes.opaque(get(system::oauth2_protected)))
        .route(
            "/api/blog/",
            get(blog::list_entries).merge(schemes.self_signed(post(blog::create_entry))),
        )
        .route(
            "/api/blog/:entry_id",
            get(blog::get_entry).merge(schemes.self_signed(
                axum::routing::put(blog::update_entry).delete(blog::delete_entry),
            )),
        )
        .route(
            "/api/blog/:entry_id/comments/",
            get(comments::list_comments).merge(schemes.self_signed(post(comments::create_comment))),
        )
        .route(
            "/api/blog/:entry_id/comments/:comment_id",
            schemes.self_signed(axum::routing::put(comments::update_comment).delete(comments::delete_comment)),
        )
}
