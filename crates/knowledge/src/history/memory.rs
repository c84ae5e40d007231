//! Process-local conversation store.

use super::{ConversationStore, Turn};
use helpdesk_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// Conversation store held in memory; history is lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: RwLock<HashMap<String, Vec<Turn>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::History("conversation store lock poisoned".to_string())
}

impl ConversationStore for InMemoryConversationStore {
    fn read(&self, session_id: &str) -> AppResult<Vec<Turn>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    fn append(&self, session_id: &str, turn: Turn) -> AppResult<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.entry(session_id.to_string()).or_default().push(turn);
        Ok(())
    }

    fn clear(&self, session_id: &str) -> AppResult<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.remove(session_id);
        Ok(())
    }
}
