//! LLM integration crate for the helpdesk RAG service.
//!
//! Every pipeline stage talks to the model through the [`LlmClient`] trait,
//! so the orchestrator never depends on a concrete provider.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **Mock**: Scripted replies keyed by prompt id, for tests
//!
//! # Example
//! ```no_run
//! use helpdesk_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("How do I activate my eSIM?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmMessage, LlmRequest, LlmResponse, LlmRole, LlmUsage};
pub use factory::create_client;
pub use providers::{MockLlmClient, OllamaClient};
