//! Reset command handler.

use super::runtime::session_id;
use clap::Args;
use helpdesk_core::{config::AppConfig, AppResult};
use helpdesk_knowledge::open_history;
use helpdesk_knowledge::rag::DEFAULT_SESSION_ID;

/// Forget the conversation history of a session
#[derive(Args, Debug)]
pub struct ResetCommand {
    /// Conversation session identifier
    #[arg(short, long, default_value = DEFAULT_SESSION_ID)]
    pub session: String,
}

impl ResetCommand {
    /// Execute the reset command.
    ///
    /// Goes straight to the store: no index or model is needed to clear it.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let session = session_id(&self.session)?;
        tracing::info!(%session, "Resetting session");

        let store = open_history(config)?;
        store.clear(session.as_str())?;

        println!("Session '{}' reset.", session);
        Ok(())
    }
}
