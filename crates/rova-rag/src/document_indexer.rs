//! Startup indexing: build the vector store from a document, or restore it from disk

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use rova_core::{
    DocumentLoader, DocumentPage, Embedder, EmbeddingTask, Error, Result, VectorDocument,
    VectorStore,
};

use crate::snapshot::{IndexSnapshot, FORMAT_VERSION};
use crate::vector_store::LocalVectorStore;

/// When a persisted snapshot may stand in for a fresh build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexReuse {
    /// Reuse any compatible snapshot, even if the document has changed since
    #[default]
    Pinned,
    /// Reuse only when the snapshot was built from identical document bytes
    ContentHash,
}

impl FromStr for IndexReuse {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pinned" => Ok(IndexReuse::Pinned),
            "content-hash" | "content_hash" | "hash" => Ok(IndexReuse::ContentHash),
            other => Err(format!(
                "unknown index reuse policy '{other}' (expected 'pinned' or 'content-hash')"
            )),
        }
    }
}

impl std::fmt::Display for IndexReuse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexReuse::Pinned => write!(f, "pinned"),
            IndexReuse::ContentHash => write!(f, "content-hash"),
        }
    }
}

/// Configuration for document indexing
#[derive(Debug, Clone, Default)]
pub struct IndexingConfig {
    /// Directory holding the snapshot; `None` disables persistence
    pub persist_dir: Option<PathBuf>,
    pub reuse: IndexReuse,
}

/// Where the served index came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOrigin {
    Built,
    Restored,
}

/// Result of an indexing operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingResult {
    pub documents_indexed: usize,
    pub pages_skipped: usize,
    pub origin: IndexOrigin,
    pub document_hash: String,
}

/// Builds the read-only index once at startup
pub struct DocumentIndexer {
    embedder: Arc<dyn Embedder>,
    config: IndexingConfig,
}

impl DocumentIndexer {
    /// Create a new document indexer
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_config(embedder, IndexingConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(embedder: Arc<dyn Embedder>, config: IndexingConfig) -> Self {
        Self { embedder, config }
    }

    /// Embed every page and build a store. Pages without text are skipped.
    pub async fn build_index(&self, pages: &[DocumentPage]) -> Result<(LocalVectorStore, usize)> {
        let mut entries = Vec::with_capacity(pages.len());
        let mut skipped = 0;

        for page in pages {
            if page.text.trim().is_empty() {
                warn!(source = %page.source, page = page.page, "Skipping page without extractable text");
                skipped += 1;
                continue;
            }

            let embedding = self
                .embedder
                .embed(&page.text, EmbeddingTask::RetrievalDocument)
                .await?;

            entries.push(VectorDocument {
                id: page.entry_id(),
                content: page.text.clone(),
                embedding: Some(embedding),
                metadata: json!({
                    "source": page.source,
                    "page": page.page,
                }),
                score: None,
            });
        }

        if entries.is_empty() {
            return Err(Error::Document(
                "document contains no extractable text".to_string(),
            ));
        }

        Ok((LocalVectorStore::build(entries)?, skipped))
    }

    /// Restore the index from the snapshot when policy allows, otherwise load, embed and persist.
    pub async fn load_or_build(
        &self,
        loader: &dyn DocumentLoader,
    ) -> Result<(LocalVectorStore, IndexingResult)> {
        let document_hash = loader.fingerprint().await?;

        if let Some(dir) = &self.config.persist_dir {
            if let Some(snapshot) = IndexSnapshot::load(dir)? {
                if self.accepts(&snapshot, loader.source(), &document_hash) {
                    let store = LocalVectorStore::build(snapshot.entries)?;
                    info!(
                        path = %IndexSnapshot::path_in(dir).display(),
                        entries = store.count(),
                        created_at = %snapshot.created_at,
                        "Restored index from snapshot"
                    );
                    let result = IndexingResult {
                        documents_indexed: store.count(),
                        pages_skipped: 0,
                        origin: IndexOrigin::Restored,
                        document_hash: snapshot.document_hash,
                    };
                    return Ok((store, result));
                }
            }
        }

        let pages = loader.load().await?;
        let (store, skipped) = self.build_index(&pages).await?;
        info!(
            source = %loader.source(),
            entries = store.count(),
            skipped,
            model = %self.embedder.model_id(),
            "Built index"
        );

        if let Some(dir) = &self.config.persist_dir {
            let snapshot = IndexSnapshot {
                format_version: FORMAT_VERSION,
                source: loader.source().to_string(),
                document_hash: document_hash.clone(),
                embedding_model: self.embedder.model_id().to_string(),
                dimension: store.dimension().unwrap_or_default(),
                created_at: Utc::now(),
                entries: store.documents().to_vec(),
            };
            let path = snapshot.save(dir)?;
            info!(path = %path.display(), "Persisted index snapshot");
        }

        let result = IndexingResult {
            documents_indexed: store.count(),
            pages_skipped: skipped,
            origin: IndexOrigin::Built,
            document_hash,
        };
        Ok((store, result))
    }

    fn accepts(&self, snapshot: &IndexSnapshot, source: &str, document_hash: &str) -> bool {
        if !snapshot.is_consistent() {
            warn!(
                entries = snapshot.entries.len(),
                dimension = snapshot.dimension,
                "Ignoring empty or inconsistent snapshot"
            );
            return false;
        }
        if snapshot.embedding_model != self.embedder.model_id() {
            warn!(
                snapshot_model = %snapshot.embedding_model,
                configured_model = %self.embedder.model_id(),
                "Ignoring snapshot built with a different embedding model"
            );
            return false;
        }

        let unchanged = snapshot.source == source && snapshot.document_hash == document_hash;
        match (self.config.reuse, unchanged) {
            (_, true) => true,
            (IndexReuse::Pinned, false) => {
                warn!(
                    snapshot_hash = %snapshot.document_hash,
                    document_hash = %document_hash,
                    "Document changed since the snapshot was built; serving the pinned snapshot"
                );
                true
            }
            (IndexReuse::ContentHash, false) => {
                info!("Document changed since the snapshot was built; rebuilding");
                false
            }
        }
    }
}
