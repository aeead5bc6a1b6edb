//! Embedder trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Embedding vector
pub type Embedding = Vec<f32>;

/// What an embedding will be used for.
///
/// Hosted embedding models produce slightly different vectors for stored
/// passages and for the questions asked against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmbeddingTask {
    /// A passage that goes into the index
    RetrievalDocument,
    /// A user question searched against the index
    RetrievalQuery,
}

impl EmbeddingTask {
    /// Wire name understood by the Gemini embedding API
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingTask::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            EmbeddingTask::RetrievalQuery => "RETRIEVAL_QUERY",
        }
    }
}

impl std::fmt::Display for EmbeddingTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for text embedding services
///
/// Every call is one remote round-trip and consumes quota. Implementations do
/// not retry; a failure ends the operation that asked for the vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Embedding>;

    /// Identifier of the embedding model, recorded alongside persisted vectors
    fn model_id(&self) -> &str;
}
