//! Sufficiency check: decide whether retrieval should be broadened.

use crate::rag::completion::PromptRunner;
use crate::types::ContextBundle;
use helpdesk_core::AppResult;
use helpdesk_prompt::defaults::REASON_PROMPT_ID;

/// Only an exact "insufficient" asks for more context.
///
/// Anything else, including empty or malformed output, counts as
/// sufficient so that ambiguous replies never trigger extra retrieval.
pub fn parse_needs_more(reply: &str) -> bool {
    reply.trim().to_lowercase() == "insufficient"
}

#[derive(Clone)]
pub struct SufficiencyReasoner {
    runner: PromptRunner,
}

impl SufficiencyReasoner {
    pub fn new(runner: PromptRunner) -> Self {
        Self { runner }
    }

    /// True when the model judges `context` insufficient for `query`.
    /// An empty context returns false without calling the model.
    pub async fn needs_more(&self, query: &str, context: &ContextBundle) -> AppResult<bool> {
        if context.is_empty() {
            tracing::debug!("Empty context, skipping sufficiency check");
            return Ok(false);
        }

        let reply = self
            .runner
            .complete(
                REASON_PROMPT_ID,
                &[("query", query), ("context", context.text())],
                Vec::new(),
            )
            .await?;

        Ok(parse_needs_more(&reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_needs_more() {
        assert!(parse_needs_more("insufficient"));
        assert!(parse_needs_more(" Insufficient \n"));
        assert!(!parse_needs_more("sufficient"));
        assert!(!parse_needs_more(""));
        assert!(!parse_needs_more("insufficient."));
        assert!(!parse_needs_more("The context is insufficient"));
    }
}
