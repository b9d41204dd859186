//! SQLite writer.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Transaction, params};

use super::sql::{CHAT_COLUMNS, CHAT_UPSERT, Dialect, MESSAGE_COLUMNS};
use crate::core::Extraction;
use crate::error::{ChatvaultError, Result};

/// Counts reported by [`SqliteWriter::write_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Chats inserted or updated
    pub chats: usize,
    /// Messages newly inserted
    pub inserted: usize,
    /// Messages already present (same chat and sequence index or msg id)
    pub skipped: usize,
}

/// Persists extractions into a SQLite database.
///
/// Every call runs in one transaction: either all chats and messages are
/// stored or none are. Re-importing the same export inserts nothing new.
pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(&Dialect::Sqlite.schema())?;
        Ok(Self { conn })
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Writes one extraction.
    pub fn write(&mut self, extraction: &Extraction) -> Result<WriteStats> {
        self.write_all(std::slice::from_ref(extraction))
    }

    /// Writes several extractions in a single transaction.
    ///
    /// Fails with [`ChatIdConflict`](ChatvaultError::ChatIdConflict) if an
    /// operator chat id already belongs to a chat with another slug; nothing
    /// is written in that case.
    pub fn write_all(&mut self, extractions: &[Extraction]) -> Result<WriteStats> {
        let tx = self.conn.transaction()?;
        let mut stats = WriteStats::default();

        for extraction in extractions {
            upsert_chat(&tx, extraction)?;
            stats.chats += 1;

            let (inserted, skipped) = insert_messages(&tx, extraction)?;
            stats.inserted += inserted;
            stats.skipped += skipped;
        }

        tx.commit()?;
        tracing::info!(
            chats = stats.chats,
            inserted = stats.inserted,
            skipped = stats.skipped,
            "sqlite write committed"
        );
        Ok(stats)
    }
}

fn upsert_chat(tx: &Transaction<'_>, extraction: &Extraction) -> Result<()> {
    let chat = &extraction.chat;

    if let Some(chat_id) = chat.id {
        let existing: Option<String> = tx
            .query_row(
                "SELECT slug FROM chats WHERE chat_id = ?1",
                params![chat_id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing_slug) = existing.filter(|slug| *slug != chat.slug) {
            return Err(ChatvaultError::ChatIdConflict {
                chat_id,
                existing_slug,
            });
        }
    }

    tx.execute(
        &format!("INSERT INTO chats ({CHAT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) {CHAT_UPSERT}"),
        params![
            chat.slug,
            chat.id,
            chat.title,
            chat.link,
            chat.joined.map(|d| d.to_string()),
            chat.is_active,
            chat.is_member,
            chat.is_public,
        ],
    )?;
    Ok(())
}

fn insert_messages(tx: &Transaction<'_>, extraction: &Extraction) -> Result<(usize, usize)> {
    let mut stmt = tx.prepare(&format!(
        "INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
         ON CONFLICT DO NOTHING"
    ))?;

    let (mut inserted, mut skipped) = (0, 0);
    for message in &extraction.messages {
        let changed = stmt.execute(params![
            extraction.chat.slug,
            message.sequence_index as i64,
            message.msg_id.map(|id| id as i64),
            message.sender_name,
            message.timestamp.map(|t| t.to_string()),
            message.timestamp_raw,
            message.text,
            message.media_type.map(|m| m.as_str()),
            message.link,
        ])?;
        if changed == 0 {
            skipped += 1;
        } else {
            inserted += changed;
        }
    }
    Ok((inserted, skipped))
}
