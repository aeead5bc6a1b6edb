//! Document loader trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One page of the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPage {
    /// Path of the file the page came from
    pub source: String,
    /// Zero-based page position in document order
    pub page: usize,
    /// Raw extracted text
    pub text: String,
}

impl DocumentPage {
    pub fn new(source: impl Into<String>, page: usize, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page,
            text: text.into(),
        }
    }

    /// Stable identifier used for the page's index entry
    pub fn entry_id(&self) -> String {
        format!("{}#page={}", self.source, self.page)
    }
}

/// Trait for document loaders
///
/// Loading is all-or-nothing: either every page is returned in order or the
/// whole load fails.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load every page of the document
    async fn load(&self) -> Result<Vec<DocumentPage>>;

    /// Content hash of the underlying document, used to detect stale indexes
    async fn fingerprint(&self) -> Result<String>;

    /// Identity of the document (usually its path)
    fn source(&self) -> &str;
}
