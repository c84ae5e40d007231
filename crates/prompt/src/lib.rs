//! Prompt system for the helpdesk RAG service.
//!
//! This crate provides structured prompt management with:
//! - Built-in definitions for every model-facing pipeline stage
//! - YAML overrides under `.helpdesk/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{list_prompts, load_prompt, PromptLibrary};
pub use types::{BuiltPrompt, PromptDefinition};
