//! Command handlers for the helpdesk CLI.

pub mod ask;
pub mod history;
pub mod reset;
mod runtime;

pub use ask::AskCommand;
pub use history::HistoryCommand;
pub use reset::ResetCommand;
