use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::{handlers, AppState};

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route(
            "/api/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route("/api/articles/:id", get(handlers::get_article))
        .route("/api/articles/:id/share", get(handlers::share_article))
        .route("/api/drafts", post(handlers::generate_draft))
        .route("/health", get(handlers::health))
}
