//! Error types for the Rova question-answering service

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types shared by every Rova crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Document error: {0}")]
    Document(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Completion returned no content: {0}")]
    EmptyCompletion(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// True when the failure originated in a remote service call.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Authentication(_)
                | Error::Network(_)
                | Error::RateLimited(_)
                | Error::Provider { .. }
                | Error::MalformedResponse(_)
                | Error::EmptyCompletion(_)
                | Error::Timeout(_)
        )
    }

    /// Short stable identifier used in logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Document(_) => "document",
            Error::VectorStore(_) => "vector_store",
            Error::Configuration(_) => "configuration",
            Error::Authentication(_) => "authentication",
            Error::Network(_) => "network",
            Error::RateLimited(_) => "rate_limited",
            Error::Provider { .. } => "provider",
            Error::MalformedResponse(_) => "malformed_response",
            Error::EmptyCompletion(_) => "empty_completion",
            Error::Serialization(_) => "serialization",
            Error::InvalidInput(_) => "invalid_input",
            Error::Timeout(_) => "timeout",
            Error::Io(_) => "io",
            Error::Other(_) => "other",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
