use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenerationRequest, GenerativeBackend};
use crate::{Error, Result};

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = GenerateContentBody {
            contents: vec![Content {
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.schema,
            },
        };

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::DraftGeneration(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::DraftGeneration(format!(
                "service returned {status}: {}",
                detail.trim()
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::DraftGeneration(format!("unreadable response: {e}")))?;

        extract_text(payload)
    }
}

fn extract_text(payload: GenerateContentResponse) -> Result<String> {
    let text: String = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::DraftGeneration(
            "response contained no text".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode, Uri},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct Received {
        path: String,
        api_key: Option<String>,
        body: Value,
    }

    struct FakeService {
        status: StatusCode,
        reply: Value,
        received: Mutex<Vec<Received>>,
    }

    async fn handle(
        State(service): State<Arc<FakeService>>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        service.received.lock().unwrap().push(Received {
            path: uri.path().to_string(),
            api_key: headers
                .get("x-goog-api-key")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
            body,
        });
        (service.status, Json(service.reply.clone()))
    }

    /// Serves `reply` with `status` on an ephemeral local port.
    async fn spawn_service(status: StatusCode, reply: Value) -> (String, Arc<FakeService>) {
        let service = Arc::new(FakeService {
            status,
            reply,
            received: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(handle).with_state(service.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), service)
    }

    fn request() -> GenerationRequest {
        GenerationRequest::for_topic("test-model", "local testing")
    }

    #[test]
    fn test_request_body_shape() {
        let schema = json!({ "type": "OBJECT" });
        let body = GenerateContentBody {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &schema,
            },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let payload: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"title\":" }, { "text": "\"x\"}" }] }
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(payload).unwrap(), "{\"title\":\"x\"}");
    }

    #[test]
    fn test_extract_text_rejects_empty_response() {
        let payload: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(matches!(
            extract_text(payload),
            Err(Error::DraftGeneration(_))
        ));

        let payload: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            extract_text(payload),
            Err(Error::DraftGeneration(_))
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client =
            GeminiClient::new("http://localhost:9/", "key", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("gemini-3-flash-preview"),
            "http://localhost:9/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_sends_key_and_returns_text() {
        let (base_url, service) = spawn_service(
            StatusCode::OK,
            json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"title\":\"A\"," }, { "text": "\"content\":\"B\"}" }] }
                }]
            }),
        )
        .await;
        let client = GeminiClient::new(&base_url, "secret-key", Duration::from_secs(5)).unwrap();

        let text = client.generate(&request()).await.unwrap();
        assert_eq!(text, "{\"title\":\"A\",\"content\":\"B\"}");

        let received = service.received.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0].path,
            "/v1beta/models/test-model:generateContent"
        );
        assert_eq!(received[0].api_key.as_deref(), Some("secret-key"));
        assert_eq!(
            received[0].body["contents"][0]["parts"][0]["text"],
            request().prompt
        );
        assert_eq!(
            received[0].body["generationConfig"]["responseSchema"]["required"],
            json!(["title", "content", "excerpt"])
        );
    }

    #[tokio::test]
    async fn test_server_error_is_draft_error() {
        let (base_url, _service) = spawn_service(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": { "message": "backend exploded" } }),
        )
        .await;
        let client = GeminiClient::new(&base_url, "secret-key", Duration::from_secs(5)).unwrap();

        let result = client.generate(&request()).await;
        assert!(matches!(
            result,
            Err(Error::DraftGeneration(msg)) if msg.contains("500") && msg.contains("backend exploded")
        ));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_draft_error() {
        let (base_url, _service) = spawn_service(StatusCode::OK, json!({ "candidates": [] })).await;
        let client = GeminiClient::new(&base_url, "secret-key", Duration::from_secs(5)).unwrap();

        let result = client.generate(&request()).await;
        assert!(matches!(result, Err(Error::DraftGeneration(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_draft_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            GeminiClient::new(format!("http://{addr}"), "secret-key", Duration::from_secs(5))
                .unwrap();

        let result = client.generate(&request()).await;
        assert!(matches!(
            result,
            Err(Error::DraftGeneration(msg)) if msg.starts_with("request failed")
        ));
    }
}
