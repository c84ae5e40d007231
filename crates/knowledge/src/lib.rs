//! Knowledge side of the helpdesk service.
//!
//! Loads the support corpus into an in-memory vector index, stores
//! conversation history, and hosts the agentic RAG pipeline in [`rag`].

pub mod chunker;
pub mod corpus;
pub mod embeddings;
pub mod history;
pub mod index;
pub mod rag;
pub mod types;
pub mod vector_index;


// Re-export commonly used types
pub use history::{ConversationStore, InMemoryConversationStore, SqliteConversationStore, Turn};
pub use index::InMemoryIndex;
pub use types::{ContextBundle, DiversityMode, Document, SearchParams};
pub use vector_index::VectorSearch;

use embeddings::{create_provider, EmbeddingConfig};
use helpdesk_core::{AppConfig, AppResult};
use std::sync::Arc;

/// Load, chunk and embed the configured corpus.
///
/// Called once at start-up; the returned index is shared read-only.
pub async fn load_index(config: &AppConfig) -> AppResult<InMemoryIndex> {
    let corpus_path = config.corpus_path();
    tracing::info!("Loading corpus from {}", corpus_path.display());

    let documents = corpus::load_corpus(
        &corpus_path,
        config.corpus.chunk_size,
        config.corpus.chunk_overlap,
    )?;

    let embedding_config = EmbeddingConfig::from_corpus(&config.corpus, config.endpoint.clone());
    let provider = create_provider(&embedding_config)?;

    InMemoryIndex::build(documents, provider).await
}

/// Open the configured conversation store.
pub fn open_history(config: &AppConfig) -> AppResult<Arc<dyn ConversationStore>> {
    if config.history.in_memory {
        tracing::debug!("Using in-memory conversation history");
        return Ok(Arc::new(InMemoryConversationStore::new()));
    }

    Ok(Arc::new(SqliteConversationStore::open(
        &config.history_path(),
    )?))
}
