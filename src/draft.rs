mod gemini;

pub use gemini::GeminiClient;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{config::API_KEY_ENV, models::DraftResult, Config, Error, Result};

pub const FALLBACK_TITLE: &str = "Sample AI Draft";

/// What is sent to the generative-text service for one draft.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub schema: Value,
}

impl GenerationRequest {
    pub fn for_topic(model: &str, topic: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt: format!(
                "Write a short, engaging blog post about: {topic}. Focus on quality and a modern tone."
            ),
            schema: draft_schema(),
        }
    }
}

/// Response-shape constraint: an object with required string fields.
pub fn draft_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "content": { "type": "STRING" },
            "excerpt": { "type": "STRING" }
        },
        "required": ["title", "content", "excerpt"]
    })
}

/// A generative-text service returning the raw JSON text of a draft.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[derive(Deserialize)]
struct DraftPayload {
    title: String,
    content: String,
    #[serde(default)]
    excerpt: Option<String>,
}

/// Turns a topic into a draft, or a fixed local draft when no credential
/// is configured.
pub struct DraftAssistant {
    backend: Option<Arc<dyn GenerativeBackend>>,
    model: String,
    timeout: Duration,
}

impl DraftAssistant {
    pub fn new(
        backend: Option<Arc<dyn GenerativeBackend>>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = match &config.api_key {
            Some(key) => {
                let client = GeminiClient::new(&config.api_base_url, key, config.draft_timeout())?;
                Some(Arc::new(client) as Arc<dyn GenerativeBackend>)
            }
            None => {
                tracing::warn!("{} not set, drafts will use the offline sample", API_KEY_ENV);
                None
            }
        };

        Ok(Self::new(backend, &config.model, config.draft_timeout()))
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn generate_draft(&self, topic: &str) -> Result<DraftResult> {
        let Some(backend) = &self.backend else {
            return Ok(fallback_draft(topic));
        };

        let request = GenerationRequest::for_topic(&self.model, topic);
        tracing::debug!("Requesting draft from {} for topic {:?}", self.model, topic);

        let result = match tokio::time::timeout(self.timeout, backend.generate(&request)).await {
            Ok(Ok(text)) => parse_draft(&text),
            Ok(Err(Error::DraftGeneration(msg))) => Err(Error::DraftGeneration(msg)),
            Ok(Err(e)) => Err(Error::DraftGeneration(e.to_string())),
            Err(_) => Err(Error::DraftGeneration(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        };

        if let Err(e) = &result {
            tracing::error!("Draft generation for {:?} failed: {}", topic, e);
        }
        result
    }
}

fn fallback_draft(topic: &str) -> DraftResult {
    DraftResult {
        title: FALLBACK_TITLE.to_string(),
        content: format!(
            "Draft for topic: {topic}. ({API_KEY_ENV} missing - please ensure it is provided in the environment)."
        ),
        excerpt: None,
    }
}

fn parse_draft(text: &str) -> Result<DraftResult> {
    let payload: DraftPayload = serde_json::from_str(text)
        .map_err(|e| Error::DraftGeneration(format!("malformed draft payload: {e}")))?;

    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(Error::DraftGeneration(
            "draft payload has an empty title or content".to_string(),
        ));
    }

    Ok(DraftResult {
        title: payload.title,
        content: payload.content,
        excerpt: payload.excerpt,
    })
}
