//! Retrieval engine for Rova
//!
//! This crate provides the PDF loader, the in-memory vector store with its
//! on-disk snapshot, the startup indexer, and the RAG engine that answers
//! questions against the built index.

mod document_indexer;
mod engine;
mod pdf_loader;
mod snapshot;
mod vector_store;


pub use document_indexer::{DocumentIndexer, IndexOrigin, IndexReuse, IndexingConfig, IndexingResult};
pub use engine::{LocalRAGEngine, DEFAULT_TOP_K};
pub use pdf_loader::PdfLoader;
pub use snapshot::{document_hash, IndexSnapshot, SNAPSHOT_FILE};
pub use vector_store::LocalVectorStore;

// Re-export core types for convenience
pub use rova_core::{
    DocumentLoader, DocumentPage, Error, RAGAnswer, RAGEngine, RAGQuery, RAGResult, Result,
    SearchConfig, SearchResult, VectorDocument, VectorStore,
};
