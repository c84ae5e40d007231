//! History command handler.

use super::runtime::session_id;
use clap::Args;
use helpdesk_core::{config::AppConfig, AppError, AppResult};
use helpdesk_knowledge::rag::DEFAULT_SESSION_ID;
use helpdesk_knowledge::{open_history, Turn};

/// Show the stored turns of a session
#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// Conversation session identifier
    #[arg(short, long, default_value = DEFAULT_SESSION_ID)]
    pub session: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HistoryCommand {
    /// Execute the history command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let session = session_id(&self.session)?;
        let turns = open_history(config)?.read(session.as_str())?;
        tracing::debug!(%session, turns = turns.len(), "Loaded history");

        if self.json {
            let json = serde_json::to_string_pretty(&turns)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else if turns.is_empty() {
            println!("No history for session '{}'.", session);
        } else {
            print!("{}", render_turns(&turns));
        }

        Ok(())
    }
}

fn render_turns(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| {
            format!(
                "[{}]\nQ: {}\nA: {}\n",
                t.created_at.format("%Y-%m-%d %H:%M:%S"),
                t.query,
                t.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_turns_in_order() {
        let turns = vec![
            Turn::new("How do I pay?", "Online."),
            Turn::new("By phone?", "Yes."),
        ];
        let text = render_turns(&turns);

        let first = text.find("Q: How do I pay?").unwrap();
        let second = text.find("Q: By phone?").unwrap();
        assert!(first < second);
        assert!(text.contains("A: Yes.\n"));
    }
}
