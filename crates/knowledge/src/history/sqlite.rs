//! SQLite-backed conversation store.

use super::{ConversationStore, Turn};
use chrono::{DateTime, Utc};
use helpdesk_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Conversation store persisted in a SQLite database.
#[derive(Debug)]
pub struct SqliteConversationStore {
    conn: Mutex<Connection>,
}

fn db_error(context: &str) -> impl Fn(rusqlite::Error) -> AppError + '_ {
    move |e| AppError::History(format!("{}: {}", context, e))
}

impl SqliteConversationStore {
    /// Open (creating if needed) the history database at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::History(format!("Failed to create history directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path).map_err(db_error("Failed to open history database"))?;
        tracing::debug!("Opened conversation history at {:?}", db_path);
        Self::with_connection(conn)
    }

    /// Store backed by a private in-memory database.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(db_error("Failed to open history database"))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                session_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                query TEXT NOT NULL,
                answer TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (session_id, seq)
            );
            "#,
        )
        .map_err(db_error("Failed to create tables"))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::History("history connection lock poisoned".to_string()))
    }
}

impl ConversationStore for SqliteConversationStore {
    fn read(&self, session_id: &str) -> AppResult<Vec<Turn>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT query, answer, created_at FROM turns WHERE session_id = ?1 ORDER BY seq",
            )
            .map_err(db_error("Failed to prepare history query"))?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(db_error("Failed to read history"))?;

        let mut turns = Vec::new();
        for row in rows {
            let (query, answer, created_at) = row.map_err(db_error("Failed to read turn"))?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| AppError::History(format!("Invalid turn timestamp: {}", e)))?;
            turns.push(Turn {
                query,
                answer,
                created_at,
            });
        }

        Ok(turns)
    }

    fn append(&self, session_id: &str, turn: Turn) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO turns (session_id, seq, query, answer, created_at)
             VALUES (?1, (SELECT COALESCE(MAX(seq), -1) + 1 FROM turns WHERE session_id = ?1), ?2, ?3, ?4)",
            params![
                session_id,
                turn.query,
                turn.answer,
                turn.created_at.to_rfc3339()
            ],
        )
        .map_err(db_error("Failed to append turn"))?;

        Ok(())
    }

    fn clear(&self, session_id: &str) -> AppResult<()> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM turns WHERE session_id = ?1", params![session_id])
            .map_err(db_error("Failed to clear session"))?;

        tracing::debug!("Cleared {} turns for session '{}'", removed, session_id);
        Ok(())
    }
}
