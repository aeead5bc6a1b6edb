//! RAG engine implementation

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use rova_core::{
    build_context, build_prompt, validate_query, Embedder, EmbeddingTask, EngineStats, Error,
    LLMProvider, RAGAnswer, RAGEngine, RAGQuery, RAGResult, Result, SearchConfig, VectorStore,
};

/// Number of passages handed to the completion model per question
pub const DEFAULT_TOP_K: usize = 3;

/// Local RAG engine: embed the question, search the in-process index, ask the model
pub struct LocalRAGEngine<V: VectorStore> {
    vector_store: Arc<V>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LLMProvider>,
    top_k: usize,
}

impl<V: VectorStore> LocalRAGEngine<V> {
    /// Create a new local RAG engine
    pub fn new(vector_store: Arc<V>, embedder: Arc<dyn Embedder>, llm: Arc<dyn LLMProvider>) -> Self {
        Self {
            vector_store,
            embedder,
            llm,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl<V: VectorStore + 'static> RAGEngine for LocalRAGEngine<V> {
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult> {
        let text = validate_query(&query.query)?;

        let vector = self
            .embedder
            .embed(text, EmbeddingTask::RetrievalQuery)
            .await?;

        let search_config = SearchConfig { top_k: query.top_k };
        let search_result = self
            .vector_store
            .search_by_vector(&vector, &search_config)
            .await?;
        let context = build_context(&search_result.documents);

        debug!(
            top_k = query.top_k,
            hits = search_result.total,
            "Retrieved context"
        );

        Ok(RAGResult {
            documents: search_result.documents,
            context,
        })
    }

    async fn answer(&self, query: &str) -> Result<RAGAnswer> {
        let started = Instant::now();
        let rag_result = self.retrieve(&RAGQuery::new(query, self.top_k)).await?;

        let prompt = build_prompt(query, &rag_result.context);
        let generation = self.llm.generate(&prompt).await?;

        if generation.text.trim().is_empty() {
            return Err(Error::EmptyCompletion(
                generation
                    .finish_reason
                    .unwrap_or_else(|| "blank answer".to_string()),
            ));
        }

        let sources: Vec<String> = rag_result.documents.iter().map(|d| d.id.clone()).collect();
        info!(
            sources = sources.len(),
            model = %generation.model_id,
            latency_ms = started.elapsed().as_millis() as u64,
            "Answered query"
        );

        Ok(RAGAnswer {
            answer: generation.text,
            model_id: generation.model_id,
            sources,
        })
    }

    fn stats(&self) -> EngineStats {
        EngineStats {
            documents: self.vector_store.count(),
            top_k: self.top_k,
            embedding_model: self.embedder.model_id().to_string(),
            completion_model: self.llm.model_id().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_indexer::DocumentIndexer;
    use crate::vector_store::LocalVectorStore;
    use rova_core::testing::{
        FailingCompletion, FailingEmbedder, FailureMode, HashingEmbedder, ScriptedCompletion,
        StaticLoader,
    };

    async fn store_for(pages: &[&str]) -> Arc<LocalVectorStore> {
        let indexer = DocumentIndexer::new(Arc::new(HashingEmbedder::default()));
        let (store, _) = indexer
            .load_or_build(&StaticLoader::new("data.pdf", pages))
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_answer_uses_retrieved_pages() {
        let store = store_for(&["Paris is the capital of France.", "The Eiffel Tower is in Paris."]).await;
        let embedder = Arc::new(HashingEmbedder::default());
        let llm = Arc::new(ScriptedCompletion::new("Paris."));
        let engine = LocalRAGEngine::new(store, embedder.clone(), llm.clone());

        let answer = engine.answer("What is the capital of France?").await.unwrap();

        assert_eq!(answer.answer, "Paris.");
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(embedder.tasks(), vec![EmbeddingTask::RetrievalQuery]);

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("User's Query: What is the capital of France?\n\nContext:\n"));
        assert!(prompts[0].contains("Paris is the capital of France."));
        assert!(prompts[0].contains("The Eiffel Tower is in Paris."));
        assert!(prompts[0].ends_with("\n\nAnswer in a human-like way."));
    }

    #[tokio::test]
    async fn test_retrieve_caps_at_top_k() {
        let store = store_for(&["one", "two", "three", "four", "five"]).await;
        let engine = LocalRAGEngine::new(
            store,
            Arc::new(HashingEmbedder::default()),
            Arc::new(ScriptedCompletion::new("ok")),
        );

        let result = engine.retrieve(&RAGQuery::new("two", DEFAULT_TOP_K)).await.unwrap();
        assert_eq!(result.documents.len(), 3);
        assert!(result.documents.iter().any(|d| d.content == "two"));
        assert_eq!(result.context.matches("\n\n").count(), 2);
    }

    #[tokio::test]
    async fn test_blank_query_never_embedded() {
        let store = store_for(&["page"]).await;
        let embedder = Arc::new(HashingEmbedder::default());
        let engine = LocalRAGEngine::new(store, embedder.clone(), Arc::new(ScriptedCompletion::new("ok")));

        assert!(matches!(engine.answer("   ").await, Err(Error::InvalidInput(_))));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failures_propagate() {
        let store = store_for(&["page"]).await;

        let engine = LocalRAGEngine::new(
            store.clone(),
            Arc::new(FailingEmbedder::new(FailureMode::Network)),
            Arc::new(ScriptedCompletion::new("ok")),
        );
        assert!(matches!(engine.answer("q").await, Err(Error::Network(_))));

        let engine = LocalRAGEngine::new(
            store.clone(),
            Arc::new(HashingEmbedder::default()),
            Arc::new(FailingCompletion::new(FailureMode::EmptyCompletion)),
        );
        assert!(matches!(engine.answer("q").await, Err(Error::EmptyCompletion(_))));

        let engine = LocalRAGEngine::new(
            store,
            Arc::new(HashingEmbedder::default()),
            Arc::new(ScriptedCompletion::new("  ")),
        );
        assert!(matches!(engine.answer("q").await, Err(Error::EmptyCompletion(_))));
    }

    #[tokio::test]
    async fn test_stats() {
        let store = store_for(&["a", "b"]).await;
        let engine = LocalRAGEngine::new(
            store,
            Arc::new(HashingEmbedder::default()),
            Arc::new(ScriptedCompletion::new("ok")),
        )
        .with_top_k(5);

        let stats = engine.stats();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.top_k, 5);
        assert_eq!(stats.embedding_model, HashingEmbedder::MODEL_ID);
        assert_eq!(stats.completion_model, ScriptedCompletion::MODEL_ID);
    }
}
