//! The orchestrator: runs one query through the stage machine.

use crate::history::{ConversationStore, Turn};
use crate::rag::answer::AnswerSynthesizer;
use crate::rag::completion::PromptRunner;
use crate::rag::domain::{refusal_answer, DomainGate, DomainVerdict};
use crate::rag::reason::SufficiencyReasoner;
use crate::rag::retriever::Retriever;
use crate::rag::state::{PipelineState, Stage};
use crate::rag::suggest::SuggestionGenerator;
use crate::rag::types::{Query, RagResponse, SessionId};
use crate::types::ContextBundle;
use crate::vector_index::VectorSearch;
use helpdesk_core::config::RetrievalConfig;
use helpdesk_core::{AppConfig, AppError, AppResult};
use helpdesk_llm::LlmClient;
use helpdesk_prompt::PromptLibrary;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::Instrument;

/// Message reported for any collaborator failure during a run.
pub const PIPELINE_FAILURE_MESSAGE: &str = "Agentic RAG processing failed.";

/// Model and retrieval settings shared by every run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub model: String,
    pub temperature: f32,
    pub retrieval: RetrievalConfig,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            retrieval: config.retrieval.clone(),
        }
    }
}

fn pipeline_failure() -> AppError {
    AppError::Pipeline(PIPELINE_FAILURE_MESSAGE.to_string())
}

type SessionTable = Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>;

/// Held session lock; prunes its table entry on drop when unshared.
struct SessionLease<'a> {
    sessions: &'a SessionTable,
    session: SessionId,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for SessionLease<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Clones are only taken under the table lock, so the count is stable here
        if let Ok(mut sessions) = self.sessions.lock() {
            let unshared = sessions
                .get(&self.session)
                .map(|entry| Arc::ptr_eq(entry, &self.lock) && Arc::strong_count(&self.lock) == 2)
                .unwrap_or(false);
            if unshared {
                sessions.remove(&self.session);
            }
        }
    }
}

/// Wires the pipeline stages together and owns per-session serialization.
pub struct Orchestrator {
    gate: DomainGate,
    retriever: Retriever,
    reasoner: SufficiencyReasoner,
    synthesizer: AnswerSynthesizer,
    suggester: SuggestionGenerator,
    store: Arc<dyn ConversationStore>,
    sessions: SessionTable,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptLibrary>,
        search: Arc<dyn VectorSearch>,
        store: Arc<dyn ConversationStore>,
        settings: &PipelineSettings,
    ) -> Self {
        let runner = PromptRunner::new(llm, prompts, settings.model.clone(), settings.temperature);

        Self {
            gate: DomainGate::new(runner.clone()),
            retriever: Retriever::from_config(search, &settings.retrieval),
            reasoner: SufficiencyReasoner::new(runner.clone()),
            synthesizer: AnswerSynthesizer::new(runner.clone()),
            suggester: SuggestionGenerator::new(runner),
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Take the lock serializing runs (and resets) of one session.
    ///
    /// The table entry lives only while some caller holds or waits on it.
    async fn lease(&self, session: &SessionId) -> AppResult<SessionLease<'_>> {
        let lock = {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| AppError::Other("session lock table poisoned".to_string()))?;
            sessions.entry(session.clone()).or_default().clone()
        };

        // Built before waiting so a cancelled wait still prunes the entry
        let mut lease = SessionLease {
            sessions: &self.sessions,
            session: session.clone(),
            lock,
            guard: None,
        };
        lease.guard = Some(lease.lock.clone().lock_owned().await);
        Ok(lease)
    }

    #[cfg(test)]
    pub(crate) fn tracked_sessions(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or_default()
    }

    /// Answer `query`, then record the turn in its session.
    pub async fn run(&self, query: Query) -> AppResult<RagResponse> {
        Ok(self.run_state(query).await?.into_response())
    }

    /// Like [`Orchestrator::run`] but returns the final pipeline state.
    ///
    /// Any collaborator error aborts the run with a generic pipeline
    /// failure; nothing is appended to history in that case.
    pub async fn run_state(&self, query: Query) -> AppResult<PipelineState> {
        let span = tracing::info_span!("pipeline", session = %query.session());
        self.run_serialized(query).instrument(span).await
    }

    async fn run_serialized(&self, query: Query) -> AppResult<PipelineState> {
        let _lease = self.lease(query.session()).await?;

        let session = query.session().clone();
        let history = self.store.read(session.as_str()).map_err(|e| {
            tracing::error!(error = %e, "Failed to read conversation history");
            pipeline_failure()
        })?;

        let mut state = PipelineState::new(query, history);
        let mut stage = Stage::DomainCheck;

        while stage != Stage::Done {
            tracing::debug!(%stage, "Entering stage");
            self.execute(stage, &mut state).await.map_err(|e| {
                tracing::error!(%stage, error = %e, "Pipeline stage failed");
                pipeline_failure()
            })?;
            state.trace.push(stage);
            stage = stage.next(&state);
        }

        let answer = state.answer.clone().unwrap_or_default();
        self.store
            .append(session.as_str(), Turn::new(state.query.text(), answer))
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to record conversation turn");
                pipeline_failure()
            })?;

        tracing::info!(
            stages = state.trace.len(),
            facts = state.context.len(),
            suggestions = state.suggested_questions.len(),
            "Pipeline completed"
        );
        Ok(state)
    }

    async fn execute(&self, stage: Stage, state: &mut PipelineState) -> AppResult<()> {
        match stage {
            Stage::DomainCheck => {
                let verdict = self.gate.classify(state.query.text()).await?;
                tracing::info!(?verdict, "Domain check");
                state.domain = Some(verdict);
                if verdict == DomainVerdict::OutOfDomain {
                    state.refuse(refusal_answer());
                }
            }
            Stage::Retrieve => {
                state.context = self.retriever.retrieve(state.query.text()).await?;
            }
            Stage::Reason => {
                state.needs_more = self
                    .reasoner
                    .needs_more(state.query.text(), &state.context)
                    .await?;
                tracing::info!(needs_more = state.needs_more, "Sufficiency check");
            }
            Stage::RetrieveAgain => {
                let existing = std::mem::replace(&mut state.context, ContextBundle::empty());
                state.context = self
                    .retriever
                    .expand(state.query.text(), existing)
                    .await?;
            }
            Stage::Respond => {
                let answer = self
                    .synthesizer
                    .answer(state.query.text(), state.context.text(), &state.history)
                    .await?;
                state.answer = Some(answer);
            }
            Stage::Reflect => {
                let answer = state.answer.as_deref().unwrap_or_default();
                state.suggested_questions = self
                    .suggester
                    .suggest(state.query.text(), answer, state.context.text())
                    .await?;
            }
            Stage::Done => {}
        }
        Ok(())
    }

    /// Forget every turn of `session`. Waits for an in-flight run on it.
    pub async fn reset(&self, session: &SessionId) -> AppResult<()> {
        let _lease = self.lease(session).await?;

        self.store.clear(session.as_str())?;
        tracing::info!(%session, "Session reset");
        Ok(())
    }

    /// Stored turns of `session`, oldest first.
    pub fn history(&self, session: &SessionId) -> AppResult<Vec<Turn>> {
        self.store.read(session.as_str())
    }
}
