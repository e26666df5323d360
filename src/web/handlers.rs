use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    models::{Article, Category, CategoryFilter, DraftResult, NewArticle},
    Error, Result,
};

use super::{AppState, CreateArticlePayload, CreatedArticle, DraftPayload, ListQuery};

pub async fn list_categories() -> Json<Vec<&'static str>> {
    Json(
        CategoryFilter::options()
            .iter()
            .map(|filter| filter.as_str())
            .collect(),
    )
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Article>>> {
    let filter = match query.category.as_deref() {
        Some(category) => category.parse()?,
        None => CategoryFilter::All,
    };

    Ok(Json(state.store.list_by_category(filter).await))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Article>> {
    let article = state.store.get(&id).await.ok_or(Error::NotFound)?;
    Ok(Json(article))
}

pub async fn share_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<String> {
    let article = state.store.get(&id).await.ok_or(Error::NotFound)?;
    Ok(article.share_text())
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateArticlePayload>,
) -> Result<(StatusCode, Json<CreatedArticle>)> {
    let category = payload
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()?;

    let new = NewArticle {
        title: payload.title,
        content: payload.content,
        author: payload.author,
        category,
    };

    let appended = state.store.append(new).await?;
    let persisted = appended.persisted();

    Ok((
        StatusCode::CREATED,
        Json(CreatedArticle {
            article: appended.article,
            persisted,
            warning: appended.persist_error.map(|e| e.to_string()),
        }),
    ))
}

pub async fn generate_draft(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DraftPayload>,
) -> Result<Json<DraftResult>> {
    let topic = payload.topic.trim();
    if topic.is_empty() {
        return Err(Error::validation("topic is required"));
    }

    let draft = state.assistant.generate_draft(topic).await?;
    Ok(Json(draft))
}

pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
