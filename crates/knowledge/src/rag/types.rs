//! RAG request and response types.

use helpdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session used when the caller does not name one.
pub const DEFAULT_SESSION_ID: &str = "default-session";

/// Identifier partitioning conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> AppResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AppError::Validation(
                "session id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self(DEFAULT_SESSION_ID.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated user question bound to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    session: SessionId,
}

impl Query {
    /// Reject queries that are empty after trimming; the stored text is trimmed.
    pub fn new(text: impl AsRef<str>, session: SessionId) -> AppResult<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(AppError::Validation("query must not be empty".to_string()));
        }
        Ok(Self {
            text: text.to_string(),
            session,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }
}

/// Result of one pipeline run, as handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    /// The question as answered
    pub query: String,

    /// Newline-joined passages the answer was grounded on
    pub facts: String,

    pub answer: String,

    /// Zero or two follow-up questions
    #[serde(rename = "suggestedQuestions")]
    pub suggested_questions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_rejects_blank_text() {
        let result = Query::new("   \n\t", SessionId::default());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_query_trims_text() {
        let query = Query::new("  How do I pay my bill?  ", SessionId::default()).unwrap();
        assert_eq!(query.text(), "How do I pay my bill?");
        assert_eq!(query.session().as_str(), DEFAULT_SESSION_ID);
    }

    #[test]
    fn test_session_id_rejects_blank() {
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new(" ").is_err());
        assert_eq!(SessionId::new("abc").unwrap().to_string(), "abc");
    }

    #[test]
    fn test_response_wire_format() {
        let response = RagResponse {
            query: "q".to_string(),
            facts: String::new(),
            answer: "a".to_string(),
            suggested_questions: vec![],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "query": "q",
                "facts": "",
                "answer": "a",
                "suggestedQuestions": []
            })
        );
    }
}
