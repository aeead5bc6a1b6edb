//! Router and request handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use rova_core::RAGEngine;

use crate::error::ApiError;

const INDEX_HTML: &str = include_str!("../templates/index.html");

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn RAGEngine>,
}

impl AppState {
    pub fn new(engine: Arc<dyn RAGEngine>) -> Self {
        Self { engine }
    }
}

/// Body of `POST /chat`.
///
/// `query` is kept loosely typed so that a missing, null or non-string value
/// is reported as a 400 with a readable message instead of a generic
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<Value>,
}

impl ChatRequest {
    fn query_text(&self) -> Result<&str, ApiError> {
        match &self.query {
            Some(Value::String(text)) if !text.trim().is_empty() => Ok(text),
            Some(Value::String(_)) => Err(ApiError::invalid_input("query must not be empty")),
            Some(Value::Null) | None => Err(ApiError::invalid_input("query is required")),
            Some(_) => Err(ApiError::invalid_input("query must be a string")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub pages: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let query = request.query_text()?;
    debug!(chars = query.len(), "Chat request");

    let answer = state.engine.answer(query).await?;
    Ok(Json(ChatResponse {
        response: answer.answer,
    }))
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        pages: state.engine.stats().documents,
    })
}
