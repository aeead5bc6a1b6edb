//! PDF document loader

use async_trait::async_trait;
use lopdf::Document;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use rova_core::{DocumentLoader, DocumentPage, Error, Result};

use crate::snapshot::document_hash;

/// Loads one PDF file as a page-per-entry document
pub struct PdfLoader {
    path: PathBuf,
    source: String,
}

impl PdfLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let source = path.display().to_string();
        Self { path, source }
    }

    fn extract_pages(path: &Path, source: &str) -> Result<Vec<DocumentPage>> {
        if !path.is_file() {
            return Err(Error::Document(format!("{source} not found")));
        }

        let doc = Document::load(path)
            .map_err(|e| Error::Document(format!("failed to parse {source}: {e}")))?;

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(Error::Document(format!("{source} has no pages")));
        }

        let mut extracted = Vec::with_capacity(pages.len());
        for (index, page_number) in pages.keys().enumerate() {
            let text = doc.extract_text(&[*page_number]).map_err(|e| {
                Error::Document(format!(
                    "failed to extract text from page {page_number} of {source}: {e}"
                ))
            })?;
            debug!(page = index, chars = text.len(), "Extracted PDF page");
            extracted.push(DocumentPage::new(source, index, text.trim()));
        }

        Ok(extracted)
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load(&self) -> Result<Vec<DocumentPage>> {
        let path = self.path.clone();
        let source = self.source.clone();
        let pages = tokio::task::spawn_blocking(move || Self::extract_pages(&path, &source))
            .await
            .map_err(|e| Error::Other(format!("PDF extraction task failed: {e}")))??;

        info!(source = %self.source, pages = pages.len(), "Loaded PDF document");
        Ok(pages)
    }

    async fn fingerprint(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::Document(format!("cannot read {}: {e}", self.source)))?;
        Ok(document_hash(&bytes))
    }

    fn source(&self) -> &str {
        &self.source
    }
}
