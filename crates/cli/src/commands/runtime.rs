//! Wiring shared by the commands: builds an orchestrator from config.

use helpdesk_core::{config::AppConfig, AppError, AppResult};
use helpdesk_knowledge::rag::{Orchestrator, PipelineSettings, SessionId};
use helpdesk_knowledge::{load_index, open_history};
use helpdesk_llm::create_client;
use helpdesk_prompt::PromptLibrary;
use std::sync::Arc;

/// Construct the full pipeline: LLM client, prompts, index and history.
pub async fn build_orchestrator(config: &AppConfig) -> AppResult<Orchestrator> {
    let llm = create_client(&config.provider, config.endpoint.as_deref()).map_err(AppError::Config)?;
    let prompts = Arc::new(PromptLibrary::load(&config.workspace)?);
    let index = Arc::new(load_index(config).await?);
    let store = open_history(config)?;

    tracing::debug!(
        provider = %config.provider,
        model = %config.model,
        passages = index.len(),
        "Orchestrator ready"
    );

    Ok(Orchestrator::new(
        llm,
        prompts,
        index,
        store,
        &PipelineSettings::from_config(config),
    ))
}

/// Parse the `--session` flag.
pub fn session_id(raw: &str) -> AppResult<SessionId> {
    SessionId::new(raw)
}
