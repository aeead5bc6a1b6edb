//! RAG (Retrieval-Augmented Generation) engine trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, VectorDocument};

/// Separator placed between retrieved passages in the prompt context
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Query for RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGQuery {
    pub query: String,
    pub top_k: usize,
}

impl RAGQuery {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
        }
    }
}

/// Result from RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGResult {
    pub documents: Vec<VectorDocument>,
    pub context: String,
}

/// A generated answer and the passages it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGAnswer {
    pub answer: String,
    pub model_id: String,
    pub sources: Vec<String>,
}

/// Snapshot of what an engine is serving
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub documents: usize,
    pub top_k: usize,
    pub embedding_model: String,
    pub completion_model: String,
}

/// Join retrieved passages into the prompt context block.
pub fn build_context(documents: &[VectorDocument]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Fill the fixed answer template.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!("User's Query: {query}\n\nContext:\n{context}\n\nAnswer in a human-like way.")
}

/// Reject queries that must never reach the embedding service.
pub fn validate_query(query: &str) -> Result<&str> {
    if query.trim().is_empty() {
        return Err(crate::Error::InvalidInput(
            "query must be a non-empty string".to_string(),
        ));
    }
    Ok(query)
}

/// Trait for RAG engines
///
/// An engine owns a fully built, read-only index and answers one question at
/// a time against it.
#[async_trait]
pub trait RAGEngine: Send + Sync {
    /// Retrieve relevant documents for a query
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult>;

    /// Retrieve context and ask the completion model
    async fn answer(&self, query: &str) -> Result<RAGAnswer>;

    /// Get statistics about the RAG engine
    fn stats(&self) -> EngineStats;
}
