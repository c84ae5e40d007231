//! Grounded answer synthesis with conversation memory.

use crate::history::Turn;
use crate::rag::completion::PromptRunner;
use helpdesk_core::AppResult;
use helpdesk_llm::LlmMessage;
use helpdesk_prompt::defaults::ANSWER_PROMPT_ID;

/// Replay prior turns as alternating user/assistant messages, oldest first.
pub fn history_messages(history: &[Turn]) -> Vec<LlmMessage> {
    history
        .iter()
        .flat_map(|turn| {
            [
                LlmMessage::user(turn.query.clone()),
                LlmMessage::assistant(turn.answer.clone()),
            ]
        })
        .collect()
}

#[derive(Clone)]
pub struct AnswerSynthesizer {
    runner: PromptRunner,
}

impl AnswerSynthesizer {
    pub fn new(runner: PromptRunner) -> Self {
        Self { runner }
    }

    /// Returns the completion text verbatim.
    pub async fn answer(&self, query: &str, context: &str, history: &[Turn]) -> AppResult<String> {
        tracing::debug!(turns = history.len(), "Synthesizing answer");

        self.runner
            .complete(
                ANSWER_PROMPT_ID,
                &[("query", query), ("context", context)],
                history_messages(history),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_llm::{LlmRole, MockLlmClient};
    use helpdesk_prompt::PromptLibrary;
    use std::sync::Arc;

    #[test]
    fn test_history_messages_alternate_in_order() {
        let history = vec![Turn::new("q1", "a1"), Turn::new("q2", "a2")];
        let messages = history_messages(&history);

        let flat: Vec<(LlmRole, &str)> = messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            flat,
            vec![
                (LlmRole::User, "q1"),
                (LlmRole::Assistant, "a1"),
                (LlmRole::User, "q2"),
                (LlmRole::Assistant, "a2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_answer_is_returned_verbatim() {
        let raw = "  Support runs 9am-9pm.\n\n";
        let mock = Arc::new(MockLlmClient::new().with_reply(ANSWER_PROMPT_ID, raw));
        let synthesizer = AnswerSynthesizer::new(PromptRunner::new(
            mock.clone(),
            Arc::new(PromptLibrary::builtin()),
            "m",
            0.2,
        ));

        let answer = synthesizer
            .answer("When?", "Support runs 9am-9pm.", &[])
            .await
            .unwrap();

        assert_eq!(answer, raw);
        assert!(mock.requests()[0].messages.is_empty());
    }
}
