//! Scripted LLM client for tests and offline runs.
//!
//! Replies are keyed by the prompt id carried on each request, so a single
//! mock can stand in for every pipeline stage at once.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use helpdesk_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Failure(String),
}

/// LLM client that answers from a script and records every request.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: HashMap<String, Scripted>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` whenever a request carries `prompt_id`.
    pub fn with_reply(mut self, prompt_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.script
            .insert(prompt_id.into(), Scripted::Reply(text.into()));
        self
    }

    /// Fail with an LLM error whenever a request carries `prompt_id`.
    pub fn with_failure(mut self, prompt_id: impl Into<String>, message: impl Into<String>) -> Self {
        self.script
            .insert(prompt_id.into(), Scripted::Failure(message.into()));
        self
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Requests received so far for one prompt id.
    pub fn requests_for(&self, prompt_id: &str) -> Vec<LlmRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.prompt_id.as_deref() == Some(prompt_id))
            .collect()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.clone());
        }

        let key = request.prompt_id.as_deref().unwrap_or_default();
        match self.script.get(key) {
            Some(Scripted::Reply(text)) => Ok(LlmResponse {
                content: text.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            Some(Scripted::Failure(message)) => Err(AppError::Llm(message.clone())),
            None => Err(AppError::Llm(format!("No scripted reply for prompt '{}'", key))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reply_is_keyed_by_prompt_id() {
        let client = MockLlmClient::new()
            .with_reply("rag.domain", "in-domain")
            .with_reply("rag.reason", "sufficient");

        let request = LlmRequest::new("q", "m").with_prompt_id("rag.reason");
        let response = client.complete(&request).await.unwrap();

        assert_eq!(response.content, "sufficient");
        assert_eq!(client.requests_for("rag.reason").len(), 1);
        assert!(client.requests_for("rag.domain").is_empty());
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let client = MockLlmClient::new().with_failure("rag.answer", "model offline");
        let request = LlmRequest::new("q", "m").with_prompt_id("rag.answer");

        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(ref m) if m == "model offline"));
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unscripted_prompt_fails() {
        let client = MockLlmClient::new();
        let request = LlmRequest::new("q", "m");

        assert!(client.complete(&request).await.is_err());
    }
}
