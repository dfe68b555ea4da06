//! # api-adapters
//!
//! The HTTP edge of Agora: server-rendered board pages, form and OAuth2
//! login with signed session cookies, and a read-only JSON surface under
//! `/api`.

pub mod auth;
pub mod error;
pub mod extract;
pub mod rest;
pub mod state;
pub mod templates;
pub mod views;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(views::root))
        .route("/articles", get(views::articles))
        .route(
            "/articles/form",
            get(views::new_article_form).post(views::create_article),
        )
        .route("/articles/search-hashtag", get(views::search_hashtag))
        .route("/articles/{article_id}", get(views::article_detail))
        .route(
            "/articles/{article_id}/form",
            get(views::edit_article_form).post(views::update_article),
        )
        .route("/articles/{article_id}/delete", post(views::delete_article))
        .route("/comments/new", post(views::create_comment))
        .route("/comments/{comment_id}/delete", post(views::delete_comment))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/oauth/callback", get(auth::oauth_callback))
        .nest("/api", rest::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
