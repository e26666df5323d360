mod kv;

pub use kv::{FileStore, KeyValueStore, MemoryStore};

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::{
    models::{Article, CategoryFilter, NewArticle},
    seed::seed_articles,
    Error, Result,
};

/// Key under which the serialized collection is stored.
pub const ARTICLES_KEY: &str = "lumina_articles";

/// Result of an append. The article is always kept in memory; a failed write
/// is reported through `persist_error`.
#[derive(Debug)]
pub struct Appended {
    pub article: Article,
    pub persist_error: Option<Error>,
}

impl Appended {
    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// The canonical article collection, newest first.
pub struct ArticleStore {
    articles: RwLock<Vec<Article>>,
    backend: Arc<dyn KeyValueStore>,
    persist_lock: Mutex<()>,
}

impl ArticleStore {
    /// Loads the stored collection, falling back to the seed articles when
    /// nothing usable is stored.
    pub async fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        let articles = match load(backend.as_ref()).await {
            Ok(Some(articles)) => {
                tracing::info!("Loaded {} stored articles", articles.len());
                articles
            }
            Ok(None) => {
                tracing::info!("No stored articles, seeding defaults");
                seed_articles()
            }
            Err(e) => {
                tracing::warn!("{}; falling back to seed articles", e);
                seed_articles()
            }
        };

        Self {
            articles: RwLock::new(articles),
            backend,
            persist_lock: Mutex::new(()),
        }
    }

    /// Prepends a new article and waits for it to be written.
    pub async fn append(&self, new: NewArticle) -> Result<Appended> {
        let article = self.insert(new).await?;

        let persist_error = match self.persist().await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Article {} kept in memory only: {}", article.id, e);
                Some(e)
            }
        };

        Ok(Appended {
            article,
            persist_error,
        })
    }

    /// Prepends a new article and writes it in the background.
    pub async fn append_detached(
        self: &Arc<Self>,
        new: NewArticle,
    ) -> Result<(Article, JoinHandle<Result<()>>)> {
        let article = self.insert(new).await?;

        let store = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = store.persist().await;
            if let Err(e) = &result {
                tracing::warn!("Background persist failed: {}", e);
            }
            result
        });

        Ok((article, handle))
    }

    /// Writes the whole collection under [`ARTICLES_KEY`]. An empty
    /// collection is never written.
    pub async fn persist(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;

        // Snapshot after taking the persist lock so writes land in order.
        let serialized = {
            let articles = self.articles.read().await;
            if articles.is_empty() {
                tracing::debug!("Skipping persist of empty collection");
                return Ok(());
            }
            serde_json::to_string(&*articles)
                .map_err(|e| Error::PersistenceWrite(e.to_string()))?
        };

        self.backend
            .set(ARTICLES_KEY, &serialized)
            .await
            .map_err(|e| Error::PersistenceWrite(e.to_string()))
    }

    pub async fn list_by_category(&self, filter: CategoryFilter) -> Vec<Article> {
        let articles = self.articles.read().await;
        articles
            .iter()
            .filter(|article| filter.matches(article.category))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<Article> {
        let articles = self.articles.read().await;
        articles.iter().find(|article| article.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }

    async fn insert(&self, new: NewArticle) -> Result<Article> {
        let article = new.into_article(Local::now())?;

        let mut articles = self.articles.write().await;
        articles.insert(0, article.clone());
        tracing::debug!(
            "Appended article {} ({}), {} total",
            article.id,
            article.category,
            articles.len()
        );

        Ok(article)
    }
}

async fn load(backend: &dyn KeyValueStore) -> Result<Option<Vec<Article>>> {
    let Some(raw) = backend
        .get(ARTICLES_KEY)
        .await
        .map_err(|e| Error::PersistenceRead(e.to_string()))?
    else {
        return Ok(None);
    };

    let articles: Vec<Article> =
        serde_json::from_str(&raw).map_err(|e| Error::PersistenceRead(e.to_string()))?;

    let mut seen = HashSet::new();
    for article in &articles {
        article
            .check()
            .map_err(|e| Error::PersistenceRead(e.to_string()))?;
        if !seen.insert(article.id.as_str()) {
            return Err(Error::PersistenceRead(format!(
                "duplicate article id {}",
                article.id
            )));
        }
    }

    if articles.is_empty() {
        return Ok(None);
    }

    Ok(Some(articles))
}
