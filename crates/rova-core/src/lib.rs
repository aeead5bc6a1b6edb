//! Core traits and types for Rova
//!
//! This crate defines the fundamental traits and types used across the Rova
//! question-answering service: document loaders, embedders, vector stores,
//! completion providers and the RAG engine that glues them together. Keeping
//! the remote services behind traits lets every other crate be tested without
//! network access.

pub mod document_loader;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod rag;
pub mod vector_store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use document_loader::{DocumentLoader, DocumentPage};
pub use embedding::{Embedder, Embedding, EmbeddingTask};
pub use error::{Error, Result};
pub use llm::{GenerationResult, LLMProvider};
pub use rag::{
    build_context, build_prompt, validate_query, EngineStats, RAGAnswer, RAGEngine, RAGQuery,
    RAGResult,
};
pub use vector_store::{SearchConfig, SearchResult, VectorDocument, VectorStore};
