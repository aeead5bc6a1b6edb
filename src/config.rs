//! Command line and environment configuration for the `rova` binary

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use std::path::PathBuf;

use rova_gemini::GeminiConfig;
use rova_rag::{IndexReuse, IndexingConfig, DEFAULT_TOP_K};

#[derive(Parser, Debug)]
#[command(
    name = "rova",
    version,
    about = "Answer questions about a PDF document with Gemini"
)]
pub struct Cli {
    /// Address to bind the HTTP server to (host:port).
    #[arg(long, env = "ROVA_BIND", default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// PDF document to index at startup.
    #[arg(long, env = "ROVA_DOCUMENT", default_value = "data.pdf")]
    pub document: PathBuf,

    /// Directory holding the persisted index snapshot.
    #[arg(long, env = "ROVA_PERSIST_DIR", default_value = "rova_db")]
    pub persist_dir: PathBuf,

    /// Keep the index in memory only.
    #[arg(long, env = "ROVA_NO_PERSIST")]
    pub no_persist: bool,

    /// When to reuse a persisted snapshot: `pinned` or `content-hash`.
    #[arg(long, env = "ROVA_INDEX_REUSE", default_value_t = IndexReuse::Pinned)]
    pub index_reuse: IndexReuse,

    /// Passages handed to the completion model per question.
    #[arg(
        long,
        env = "ROVA_TOP_K",
        default_value_t = DEFAULT_TOP_K,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub top_k: usize,

    /// Seconds before an embedding or completion call is abandoned.
    /// Overrides GEMINI_TIMEOUT_SECS; both default to 60.
    #[arg(
        long,
        env = "ROVA_REQUEST_TIMEOUT_SECS",
        value_parser = RangedU64ValueParser::<u64>::new().range(1..)
    )]
    pub request_timeout_secs: Option<u64>,
}

impl Cli {
    pub fn indexing_config(&self) -> IndexingConfig {
        IndexingConfig {
            persist_dir: (!self.no_persist).then(|| self.persist_dir.clone()),
            reuse: self.index_reuse,
        }
    }

    /// Layer the command line timeout over the environment's Gemini settings.
    pub fn gemini_config(&self, config: GeminiConfig) -> GeminiConfig {
        match self.request_timeout_secs {
            Some(secs) => config.with_timeout_secs(secs),
            None => config,
        }
    }
}
