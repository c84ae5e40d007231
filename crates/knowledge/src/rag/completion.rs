//! Shared plumbing for pipeline stages that call the completion service.

use helpdesk_core::AppResult;
use helpdesk_llm::{LlmClient, LlmMessage, LlmRequest};
use helpdesk_prompt::{build_prompt, PromptLibrary};
use std::collections::HashMap;
use std::sync::Arc;

/// Renders a named prompt and sends it to the model.
#[derive(Clone)]
pub struct PromptRunner {
    client: Arc<dyn LlmClient>,
    prompts: Arc<PromptLibrary>,
    model: String,
    temperature: f32,
}

impl PromptRunner {
    pub fn new(
        client: Arc<dyn LlmClient>,
        prompts: Arc<PromptLibrary>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            prompts,
            model: model.into(),
            temperature,
        }
    }

    /// Render `prompt_id` with `vars`, replay `history` between the system
    /// instruction and the user message, and return the raw completion text.
    pub async fn complete(
        &self,
        prompt_id: &str,
        vars: &[(&str, &str)],
        history: Vec<LlmMessage>,
    ) -> AppResult<String> {
        let definition = self.prompts.get(prompt_id)?;
        let variables: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let built = build_prompt(definition, &variables)?;

        let mut request = LlmRequest::new(built.user, self.model.clone())
            .with_prompt_id(prompt_id)
            .with_messages(history)
            .with_temperature(self.temperature);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_llm::MockLlmClient;
    use helpdesk_prompt::defaults::REASON_PROMPT_ID;

    #[tokio::test]
    async fn test_complete_renders_prompt_and_tags_request() {
        let mock = Arc::new(MockLlmClient::new().with_reply(REASON_PROMPT_ID, "sufficient"));
        let runner = PromptRunner::new(
            mock.clone(),
            Arc::new(PromptLibrary::builtin()),
            "llama3.2",
            0.2,
        );

        let reply = runner
            .complete(
                REASON_PROMPT_ID,
                &[("query", "Can I roam in Spain?"), ("context", "Roaming covers the EU.")],
                Vec::new(),
            )
            .await
            .unwrap();

        assert_eq!(reply, "sufficient");
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "llama3.2");
        assert_eq!(requests[0].temperature, Some(0.2));
        assert_eq!(
            requests[0].prompt,
            "Question:\nCan I roam in Spain?\n\nContext:\nRoaming covers the EU."
        );
        assert!(requests[0].system.is_some());
    }

    #[tokio::test]
    async fn test_unknown_prompt_is_error() {
        let runner = PromptRunner::new(
            Arc::new(MockLlmClient::new()),
            Arc::new(PromptLibrary::builtin()),
            "m",
            0.2,
        );

        assert!(runner.complete("rag.missing", &[], Vec::new()).await.is_err());
    }
}
