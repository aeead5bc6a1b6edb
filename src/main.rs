use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rova_core::{Embedder, LLMProvider, RAGEngine};
use rova_gemini::{GeminiClient, GeminiConfig};
use rova_rag::{DocumentIndexer, LocalRAGEngine, PdfLoader};
use rova_web::{router, AppState};

mod config;

use config::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Remote model service
    let gemini_config =
        cli.gemini_config(GeminiConfig::from_env().context("failed to read Gemini configuration")?);
    let client = Arc::new(GeminiClient::new(gemini_config).context("failed to create Gemini client")?);
    let embedder: Arc<dyn Embedder> = client.clone();
    let llm: Arc<dyn LLMProvider> = client;

    // Index, built once and read-only afterwards
    let loader = PdfLoader::new(&cli.document);
    let indexer = DocumentIndexer::with_config(embedder.clone(), cli.indexing_config());
    let (store, indexing) = indexer
        .load_or_build(&loader)
        .await
        .with_context(|| format!("failed to index {}", cli.document.display()))?;
    info!(
        pages = indexing.documents_indexed,
        skipped = indexing.pages_skipped,
        origin = ?indexing.origin,
        "Index ready"
    );

    let engine = LocalRAGEngine::new(Arc::new(store), embedder, llm).with_top_k(cli.top_k);
    let stats = engine.stats();
    let app = router(AppState::new(Arc::new(engine)));

    let addr: SocketAddr = cli
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        top_k = stats.top_k,
        embedding_model = %stats.embedding_model,
        completion_model = %stats.completion_model,
        "rova listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;
    info!("rova stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
