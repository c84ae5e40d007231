//! Ask command handler.
//!
//! Runs one query through the RAG pipeline and prints the reply.

use super::runtime::{build_orchestrator, session_id};
use clap::Args;
use helpdesk_core::{config::AppConfig, AppError, AppResult};
use helpdesk_knowledge::rag::{Query, RagResponse, DEFAULT_SESSION_ID, PIPELINE_FAILURE_MESSAGE};

/// Ask the support assistant a question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Conversation session identifier
    #[arg(short, long, default_value = DEFAULT_SESSION_ID)]
    pub session: String,

    /// Output the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let query = Query::new(&self.query, session_id(&self.session)?)?;
        let orchestrator = build_orchestrator(config).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialise pipeline");
            AppError::Pipeline(PIPELINE_FAILURE_MESSAGE.to_string())
        })?;
        let response = orchestrator.run(query).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            print!("{}", render_text(&response));
        }

        Ok(())
    }
}

/// Plain-text layout: the answer, the supporting facts, then numbered follow-ups.
fn render_text(response: &RagResponse) -> String {
    let mut out = format!("{}\n", response.answer);

    if !response.facts.is_empty() {
        out.push_str("\nFrom the support materials:\n");
        for line in response.facts.lines() {
            out.push_str(&format!("  > {}\n", line));
        }
    }

    if !response.suggested_questions.is_empty() {
        out.push_str("\nYou might also ask:\n");
        for (i, question) in response.suggested_questions.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, question));
        }
    }

    out
}
