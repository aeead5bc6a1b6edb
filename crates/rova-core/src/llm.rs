//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Result;

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub finish_reason: Option<String>,
    pub tokens_used: Option<u32>,
}

/// Trait for hosted completion models (e.g., Gemini)
///
/// A provider takes one fully assembled prompt and returns one answer. There is
/// no conversation state and no sampling configuration on this interface.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a single completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<GenerationResult>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
