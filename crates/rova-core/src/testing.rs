//! Deterministic stand-ins for the remote services, for tests in every crate.
//!
//! Enabled with the `testing` feature. Nothing here talks to the network.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{
    DocumentLoader, DocumentPage, Embedder, Embedding, EmbeddingTask, Error, GenerationResult,
    LLMProvider, Result,
};

/// Which typed failure a failing stub produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Network,
    Authentication,
    RateLimited,
    Timeout,
    EmptyCompletion,
    Malformed,
}

impl FailureMode {
    pub fn to_error(self) -> Error {
        match self {
            FailureMode::Network => Error::Network("connection refused".to_string()),
            FailureMode::Authentication => Error::Authentication("API key not valid".to_string()),
            FailureMode::RateLimited => Error::RateLimited("quota exhausted".to_string()),
            FailureMode::Timeout => Error::Timeout("request timed out".to_string()),
            FailureMode::EmptyCompletion => Error::EmptyCompletion("SAFETY".to_string()),
            FailureMode::Malformed => Error::MalformedResponse("missing field".to_string()),
        }
    }
}

/// Feature-hashing embedder: the same text always maps to the same unit vector.
pub struct HashingEmbedder {
    dimension: usize,
    calls: AtomicUsize,
    tasks: Mutex<Vec<EmbeddingTask>>,
}

impl HashingEmbedder {
    pub const MODEL_ID: &'static str = "test/hashing-embedder";

    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Number of `embed` calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tasks requested so far, in call order
    pub fn tasks(&self) -> Vec<EmbeddingTask> {
        self.tasks.lock().expect("tasks lock").clone()
    }

    pub fn vector_for(&self, text: &str) -> Embedding {
        let mut tf = vec![0.0f32; self.dimension];
        for token in text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            tf[(hasher.finish() as usize) % self.dimension] += 1.0;
        }

        let norm: f32 = tf.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut tf {
                *x /= norm;
            }
        }
        tf
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tasks.lock().expect("tasks lock").push(task);
        Ok(self.vector_for(text))
    }

    fn model_id(&self) -> &str {
        Self::MODEL_ID
    }
}

/// Embedder that always fails with the configured error
pub struct FailingEmbedder {
    mode: FailureMode,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn new(mode: FailureMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str, _task: EmbeddingTask) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.mode.to_error())
    }

    fn model_id(&self) -> &str {
        HashingEmbedder::MODEL_ID
    }
}

/// Completion provider that replies with a fixed answer and records prompts
pub struct ScriptedCompletion {
    answer: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub const MODEL_ID: &'static str = "test/scripted-completion";

    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedCompletion {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        self.prompts.lock().expect("prompts lock").push(prompt.to_string());
        Ok(GenerationResult {
            text: self.answer.clone(),
            model_id: Self::MODEL_ID.to_string(),
            finish_reason: Some("STOP".to_string()),
            tokens_used: None,
        })
    }

    fn model_id(&self) -> &str {
        Self::MODEL_ID
    }
}

/// Completion provider that always fails with the configured error
pub struct FailingCompletion {
    mode: FailureMode,
}

impl FailingCompletion {
    pub fn new(mode: FailureMode) -> Self {
        Self { mode }
    }
}

#[async_trait]
impl LLMProvider for FailingCompletion {
    async fn generate(&self, _prompt: &str) -> Result<GenerationResult> {
        Err(self.mode.to_error())
    }

    fn model_id(&self) -> &str {
        ScriptedCompletion::MODEL_ID
    }
}

/// Loader that serves fixed page texts
pub struct StaticLoader {
    source: String,
    texts: Vec<String>,
}

impl StaticLoader {
    pub fn new(source: impl Into<String>, texts: &[&str]) -> Self {
        Self {
            source: source.into(),
            texts: texts.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load(&self) -> Result<Vec<DocumentPage>> {
        if self.texts.is_empty() {
            return Err(Error::Document(format!("{} has no pages", self.source)));
        }
        Ok(self
            .texts
            .iter()
            .enumerate()
            .map(|(page, text)| DocumentPage::new(self.source.clone(), page, text.clone()))
            .collect())
    }

    async fn fingerprint(&self) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        self.texts.hash(&mut hasher);
        Ok(format!("{:016x}", hasher.finish()))
    }

    fn source(&self) -> &str {
        &self.source
    }
}
