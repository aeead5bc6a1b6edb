//! HTTP surface for Rova: landing page, chat endpoint and health probe

mod error;
mod routes;

#[cfg(test)]
mod tests;

pub use error::{ApiError, ErrorBody};
pub use routes::{router, AppState, ChatRequest, ChatResponse, HealthResponse};

// Re-export core types
pub use rova_core::{Error, Result};
