//! In-memory vector store

use async_trait::async_trait;
use std::cmp::Ordering;

use rova_core::{Error, Result, SearchConfig, SearchResult, VectorDocument, VectorStore};

/// Read-only in-memory index searched by cosine similarity.
///
/// Built once from embedded pages; there is no way to add or remove entries
/// afterwards, so it can be shared behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct LocalVectorStore {
    documents: Vec<VectorDocument>,
    dimension: Option<usize>,
}

impl LocalVectorStore {
    /// Build a store from documents that already carry embeddings.
    pub fn build(documents: Vec<VectorDocument>) -> Result<Self> {
        let mut dimension: Option<usize> = None;

        for doc in &documents {
            let embedding = doc.embedding.as_ref().ok_or_else(|| {
                Error::VectorStore(format!("document {} has no embedding", doc.id))
            })?;
            if embedding.is_empty() {
                return Err(Error::VectorStore(format!(
                    "document {} has an empty embedding",
                    doc.id
                )));
            }
            match dimension {
                None => dimension = Some(embedding.len()),
                Some(expected) if expected != embedding.len() => {
                    return Err(Error::VectorStore(format!(
                        "dimension mismatch for {}: expected {}, got {}",
                        doc.id,
                        expected,
                        embedding.len()
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            documents,
            dimension,
        })
    }

    /// Stored entries in build order, embeddings included
    pub fn documents(&self) -> &[VectorDocument] {
        &self.documents
    }

    /// Simple cosine similarity calculation
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        if config.top_k == 0 || self.documents.is_empty() {
            return Ok(SearchResult {
                documents: Vec::new(),
                total: 0,
            });
        }

        if let Some(expected) = self.dimension {
            if vector.len() != expected {
                return Err(Error::VectorStore(format!(
                    "query dimension {} does not match index dimension {}",
                    vector.len(),
                    expected
                )));
            }
        }

        let mut results: Vec<VectorDocument> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let embedding = doc.embedding.as_ref()?;
                Some(VectorDocument {
                    id: doc.id.clone(),
                    content: doc.content.clone(),
                    embedding: None,
                    metadata: doc.metadata.clone(),
                    score: Some(Self::cosine_similarity(vector, embedding)),
                })
            })
            .collect();

        // Stable: equal scores keep build order.
        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
        });

        results.truncate(config.top_k);

        let total = results.len();

        Ok(SearchResult {
            documents: results,
            total,
        })
    }

    fn count(&self) -> usize {
        self.documents.len()
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
