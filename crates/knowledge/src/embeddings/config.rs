//! Embedding configuration derived from the corpus settings.

use helpdesk_core::config::CorpusConfig;
use serde::{Deserialize, Serialize};

/// Default Ollama embedding model.
pub const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Settings needed to construct an embedding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name ("trigram" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Provider endpoint, for networked providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    /// Build from the corpus section of the application config.
    pub fn from_corpus(corpus: &CorpusConfig, endpoint: Option<String>) -> Self {
        let model = corpus.embedding_model.clone().unwrap_or_else(|| {
            match corpus.embedding_provider.as_str() {
                "ollama" => DEFAULT_OLLAMA_EMBEDDING_MODEL.to_string(),
                _ => "trigram-v1".to_string(),
            }
        });

        Self {
            provider: corpus.embedding_provider.clone(),
            model,
            dimensions: corpus.embedding_dim,
            endpoint,
        }
    }
}
