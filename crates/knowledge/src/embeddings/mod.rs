//! Embedding providers for the corpus index.
//!
//! The index embeds every passage once at start-up and each query at search
//! time, always through the same provider.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
