//! Google Gemini integration for Rova
//!
//! This crate provides the Gemini implementation of the `Embedder` and
//! `LLMProvider` traits over the public REST API.

mod client;
mod config;


pub use client::GeminiClient;
pub use config::GeminiConfig;

// Re-export core types for convenience
pub use rova_core::{
    Embedder, Embedding, EmbeddingTask, Error, GenerationResult, LLMProvider, Result,
};
