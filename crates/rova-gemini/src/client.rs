//! Gemini REST client implementation

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

use rova_core::{
    Embedder, Embedding, EmbeddingTask, Error, GenerationResult, LLMProvider, Result,
};

use crate::config::GeminiConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client serving both embeddings and completions
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
    current_model: String,
    embedding_model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: EmbeddingTask,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

impl GeminiClient {
    /// Model constants
    pub const GEMINI_1_5_FLASH: &'static str = "gemini-1.5-flash";
    pub const EMBEDDING_001: &'static str = "models/embedding-001";

    /// Create a new Gemini client from configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Configuration("Gemini API key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(config.api_key.trim())
            .map_err(|_| Error::Configuration("Gemini API key is not a valid header value".to_string()))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            current_model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            timeout: config.timeout(),
            config,
            client,
        })
    }

    /// Bound every remote call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/{}:{}",
            self.config.api_url.trim_end_matches('/'),
            model_path(model),
            method
        )
    }

    /// POST a JSON body and decode the JSON reply, mapping every failure to a typed error
    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let exchange = async {
            let response = self
                .client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(map_transport_error)?;

            let status = response.status();
            let text = response.text().await.map_err(map_transport_error)?;

            if !status.is_success() {
                return Err(map_status_error(status, &text));
            }

            serde_json::from_str::<R>(&text).map_err(|e| {
                Error::MalformedResponse(format!("could not decode Gemini response: {e}"))
            })
        };

        match timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "Gemini request exceeded {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Embedding> {
        let model = model_path(&self.embedding_model);
        let request = EmbedContentRequest {
            model: &model,
            content: Content {
                role: None,
                parts: vec![Part { text }],
            },
            task_type: task,
        };

        let started = Instant::now();
        let url = self.endpoint(&self.embedding_model, "embedContent");
        let response: EmbedContentResponse = self.post_json(&url, &request).await?;
        let values = extract_embedding(response)?;

        debug!(
            model = %self.embedding_model,
            task = %task,
            dimension = values.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Embedded text"
        );
        Ok(values)
    }

    fn model_id(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl LLMProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
        };

        let started = Instant::now();
        let url = self.endpoint(&self.current_model, "generateContent");
        let response: GenerateContentResponse = self.post_json(&url, &request).await?;
        let tokens_used = response
            .usage_metadata
            .as_ref()
            .and_then(|usage| usage.total_token_count);
        let (text, finish_reason) = extract_answer(response)?;

        debug!(
            model = %self.current_model,
            chars = text.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Generated completion"
        );

        Ok(GenerationResult {
            text,
            model_id: self.current_model.clone(),
            finish_reason,
            tokens_used,
        })
    }

    fn model_id(&self) -> &str {
        &self.current_model
    }
}

/// Gemini addresses models as `models/<id>`; accept either spelling.
pub(crate) fn model_path(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(err.to_string())
    } else if err.is_decode() {
        Error::MalformedResponse(err.to_string())
    } else {
        Error::Network(err.to_string())
    }
}

/// Classify a non-2xx reply.
pub(crate) fn map_status_error(status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|env| env.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let api_status = detail.and_then(|d| d.status).unwrap_or_default();

    // Gemini reports a bad key as 400 INVALID_ARGUMENT rather than 401.
    let bad_key = message.contains("API key not valid") || body.contains("API_KEY_INVALID");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(message),
        StatusCode::BAD_REQUEST if bad_key => Error::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
        _ if api_status == "RESOURCE_EXHAUSTED" => Error::RateLimited(message),
        _ => Error::Provider {
            status: status.as_u16(),
            message,
        },
    }
}

pub(crate) fn extract_embedding(response: EmbedContentResponse) -> Result<Embedding> {
    let values = response
        .embedding
        .map(|e| e.values)
        .unwrap_or_default();
    if values.is_empty() {
        return Err(Error::MalformedResponse(
            "embedding response carried no values".to_string(),
        ));
    }
    Ok(values)
}

/// Pull the answer text out of the first candidate.
pub(crate) fn extract_answer(response: GenerateContentResponse) -> Result<(String, Option<String>)> {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(Error::EmptyCompletion(
            block_reason.unwrap_or_else(|| "no candidates returned".to_string()),
        ));
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::EmptyCompletion(
            candidate
                .finish_reason
                .unwrap_or_else(|| "candidate had no text".to_string()),
        ));
    }

    Ok((text.trim().to_string(), candidate.finish_reason))
}
