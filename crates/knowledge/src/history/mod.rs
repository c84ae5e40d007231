//! Conversation history: prior (query, answer) turns per session.
//!
//! Sessions exist implicitly from their first append and disappear only
//! through `clear`.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryConversationStore;
pub use sqlite::SqliteConversationStore;

use chrono::{DateTime, Utc};
use helpdesk_core::AppResult;
use serde::{Deserialize, Serialize};

/// One recorded exchange within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub query: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// A turn stamped with the current time.
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
            created_at: Utc::now(),
        }
    }
}

/// Per-session ordered turn storage.
///
/// `read` returns turns in append order. Each `append` is atomic; ordering
/// across concurrent appends to one session is up to the caller.
pub trait ConversationStore: Send + Sync {
    fn read(&self, session_id: &str) -> AppResult<Vec<Turn>>;

    fn append(&self, session_id: &str, turn: Turn) -> AppResult<()>;

    /// Remove every turn of a session. Clearing an unknown session is a no-op.
    fn clear(&self, session_id: &str) -> AppResult<()>;
}
