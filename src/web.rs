mod handlers;
mod routes;


pub use routes::create_routes;

use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{draft::DraftAssistant, models::Article, store::ArticleStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ArticleStore>,
    pub assistant: Arc<DraftAssistant>,
}

impl AppState {
    pub fn new(store: Arc<ArticleStore>, assistant: Arc<DraftAssistant>) -> Arc<Self> {
        Arc::new(Self { store, assistant })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticlePayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub author: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DraftPayload {
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedArticle {
    pub article: Article,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: String, state: Arc<AppState>) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::Error::Internal(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
