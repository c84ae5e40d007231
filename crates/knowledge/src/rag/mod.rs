//! Agentic RAG pipeline.
//!
//! One query flows through a fixed stage machine:
//! domain check, retrieval, sufficiency reasoning, an optional broadened
//! retrieval, answer synthesis and follow-up suggestions.

pub mod answer;
pub mod completion;
pub mod domain;
pub mod graph;
pub mod reason;
pub mod retriever;
pub mod state;
pub mod suggest;
pub mod types;

pub use domain::{refusal_answer, DomainGate, DomainVerdict};
pub use graph::{Orchestrator, PipelineSettings, PIPELINE_FAILURE_MESSAGE};
pub use state::{PipelineState, Stage};
pub use suggest::{parse_suggestions, SuggestionGenerator, FALLBACK_QUESTIONS};
pub use types::{Query, RagResponse, SessionId, DEFAULT_SESSION_ID};
