//! Pipeline state record and the stage transition function.

use crate::history::Turn;
use crate::rag::domain::DomainVerdict;
use crate::rag::types::{Query, RagResponse};
use crate::types::ContextBundle;
use serde::Serialize;
use std::fmt;

/// Named pipeline stages. `DomainCheck` is initial, `Done` terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DomainCheck,
    Retrieve,
    Reason,
    RetrieveAgain,
    Respond,
    Reflect,
    Done,
}

impl Stage {
    /// Pure transition over the state left behind by this stage.
    pub fn next(self, state: &PipelineState) -> Stage {
        match self {
            Stage::DomainCheck => match state.domain {
                Some(DomainVerdict::OutOfDomain) => Stage::Done,
                _ => Stage::Retrieve,
            },
            Stage::Retrieve => Stage::Reason,
            Stage::Reason if state.needs_more => Stage::RetrieveAgain,
            Stage::Reason => Stage::Respond,
            Stage::RetrieveAgain => Stage::Respond,
            Stage::Respond => Stage::Reflect,
            Stage::Reflect | Stage::Done => Stage::Done,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DomainCheck => "domain_check",
            Stage::Retrieve => "retrieve",
            Stage::Reason => "reason",
            Stage::RetrieveAgain => "retrieve_again",
            Stage::Respond => "respond",
            Stage::Reflect => "reflect",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// The single record threaded through one pipeline run.
///
/// Created with only the query and the session's prior turns; each stage
/// fills its own fields. Owned by exactly one in-flight request.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub query: Query,

    /// Session turns read at entry, oldest first
    pub history: Vec<Turn>,

    pub domain: Option<DomainVerdict>,
    pub context: ContextBundle,
    pub answer: Option<String>,
    pub suggested_questions: Vec<String>,
    pub needs_more: bool,

    /// Stages executed, in order
    pub trace: Vec<Stage>,
}

impl PipelineState {
    pub fn new(query: Query, history: Vec<Turn>) -> Self {
        Self {
            query,
            history,
            domain: None,
            context: ContextBundle::empty(),
            answer: None,
            suggested_questions: Vec::new(),
            needs_more: false,
            trace: Vec::new(),
        }
    }

    /// Out-of-domain short circuit: fixed answer, nothing retrieved.
    pub fn refuse(&mut self, answer: String) {
        self.answer = Some(answer);
        self.context = ContextBundle::empty();
        self.suggested_questions.clear();
        self.needs_more = false;
    }

    pub fn into_response(self) -> RagResponse {
        RagResponse {
            query: self.query.text().to_string(),
            facts: self.context.text().to_string(),
            answer: self.answer.unwrap_or_default(),
            suggested_questions: self.suggested_questions,
        }
    }
}
