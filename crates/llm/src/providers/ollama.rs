//! Ollama LLM provider implementation.
//!
//! Talks to the chat endpoint of a local Ollama runtime so that system
//! instructions and prior conversation turns travel as separate messages.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use helpdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default URL of a local Ollama runtime.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Ollama chat message.
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Sampling options understood by Ollama.
#[derive(Debug, Serialize, Default)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Ollama `/api/chat` request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    options: OllamaOptions,
    stream: bool,
}

/// Ollama `/api/chat` response format.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client pointing at the default local runtime.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_OLLAMA_URL)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Convert LlmRequest to the Ollama chat format.
    ///
    /// Message order: system, prior conversation (oldest first), prompt.
    fn to_chat_request(&self, request: &LlmRequest) -> OllamaChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 2);

        if let Some(ref system) = request.system {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.extend(request.messages.iter().map(|m| OllamaMessage {
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
        }));

        messages.push(OllamaMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        OllamaChatRequest {
            model: request.model.clone(),
            messages,
            options: OllamaOptions {
                temperature: request.temperature,
            },
            stream: false,
        }
    }

    /// Convert an Ollama response to LlmResponse.
    fn convert_response(&self, response: OllamaChatResponse) -> LlmResponse {
        LlmResponse {
            content: response.message.content,
            model: response.model,
            usage: LlmUsage::new(
                response.prompt_eval_count.unwrap_or(0),
                response.eval_count.unwrap_or(0),
            ),
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(
            prompt_id = request.prompt_id.as_deref().unwrap_or("-"),
            model = %request.model,
            history = request.messages.len(),
            "Sending chat request to Ollama"
        );

        let chat_request = self.to_chat_request(request);
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        let response = self.convert_response(chat_response);

        tracing::debug!(
            prompt_id = request.prompt_id.as_deref().unwrap_or("-"),
            tokens = response.usage.total_tokens,
            "Received completion from Ollama"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LlmMessage;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::with_base_url("http://localhost:11434/");
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_chat_request_message_order() {
        let client = OllamaClient::new();
        let request = LlmRequest::new("What are Wi-Fi support hours?", "llama3.2")
            .with_system("Answer only from context")
            .with_messages(vec![
                LlmMessage::user("How do I pay my bill?"),
                LlmMessage::assistant("Use the online portal."),
            ])
            .with_temperature(0.2);

        let chat = client.to_chat_request(&request);
        let roles: Vec<&str> = chat.messages.iter().map(|m| m.role.as_str()).collect();

        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(chat.messages[3].content, "What are Wi-Fi support hours?");
        assert_eq!(chat.options.temperature, Some(0.2));
        assert_eq!(
            serde_json::to_value(&chat.options).unwrap(),
            serde_json::json!({ "temperature": 0.2f32 })
        );
        assert!(!chat.stream);
    }

    #[test]
    fn test_chat_request_without_system() {
        let client = OllamaClient::new();
        let chat = client.to_chat_request(&LlmRequest::new("Hello", "llama3.2"));

        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].role, "user");
    }

    #[test]
    fn test_convert_response() {
        let client = OllamaClient::new();
        let raw: OllamaChatResponse = serde_json::from_str(
            r#"{"model":"llama3.2","message":{"role":"assistant","content":"in-domain"},"done":true,"prompt_eval_count":10,"eval_count":2}"#,
        )
        .unwrap();

        let response = client.convert_response(raw);
        assert_eq!(response.content, "in-domain");
        assert_eq!(response.usage.total_tokens, 12);
    }
}
