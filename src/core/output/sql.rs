//! SQL rendering for the relational writers.
//!
//! [`Dialect`] renders the schema and an idempotent insert script for
//! SQLite or PostgreSQL. The script can be piped into `sqlite3` or `psql`;
//! [`SqliteWriter`](super::SqliteWriter) runs the same statements directly.
//!
//! Timestamps are stored as ISO-8601 text in both dialects so naive values
//! are never reinterpreted in the session time zone.

use std::fmt::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::Extraction;
use crate::error::ChatvaultError;
use crate::{Chat, Message};

/// Rows per multi-row `INSERT` in rendered scripts.
const INSERT_BATCH: usize = 500;

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
}

pub(crate) const CHAT_COLUMNS: &str =
    "slug, chat_id, title, link, joined, is_active, is_member, is_public";

pub(crate) const MESSAGE_COLUMNS: &str =
    "chat_slug, sequence_index, msg_id, sender_name, sent_at, sent_at_raw, text, media_type, link";

/// Upsert tail shared by both dialects.
pub(crate) const CHAT_UPSERT: &str = "ON CONFLICT (slug) DO UPDATE SET \
     chat_id = excluded.chat_id, title = excluded.title, link = excluded.link, \
     joined = excluded.joined, is_active = excluded.is_active, \
     is_member = excluded.is_member, is_public = excluded.is_public";

impl Dialect {
    /// Name as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
        }
    }

    /// `CREATE TABLE` / `CREATE INDEX` statements, safe to run repeatedly.
    pub fn schema(&self) -> String {
        let (int, big, boolean, date) = match self {
            Dialect::Sqlite => ("INTEGER", "INTEGER", "INTEGER", "TEXT"),
            Dialect::Postgres => ("INTEGER", "BIGINT", "BOOLEAN", "DATE"),
        };
        let active_default = self.bool_literal(true);

        format!(
            "CREATE TABLE IF NOT EXISTS chats (
    slug TEXT PRIMARY KEY,
    chat_id {big} UNIQUE,
    title TEXT NOT NULL,
    link TEXT,
    joined {date},
    is_active {boolean} NOT NULL DEFAULT {active_default},
    is_member {boolean},
    is_public {boolean}
);

CREATE TABLE IF NOT EXISTS messages (
    chat_slug TEXT NOT NULL REFERENCES chats (slug) ON DELETE CASCADE,
    sequence_index {int} NOT NULL,
    msg_id {big},
    sender_name TEXT NOT NULL,
    sent_at TEXT,
    sent_at_raw TEXT,
    text TEXT NOT NULL DEFAULT '',
    media_type TEXT,
    link TEXT,
    PRIMARY KEY (chat_slug, sequence_index)
);

CREATE UNIQUE INDEX IF NOT EXISTS messages_chat_msg_id
    ON messages (chat_slug, msg_id) WHERE msg_id IS NOT NULL;
"
        )
    }

    /// Schema plus one transaction upserting the chat and inserting its
    /// messages; existing message keys are left untouched.
    pub fn insert_script(&self, extraction: &Extraction) -> String {
        let mut sql = String::new();
        let _ = writeln!(sql, "BEGIN;");
        let _ = writeln!(
            sql,
            "INSERT INTO chats ({CHAT_COLUMNS})\nVALUES ({})\n{CHAT_UPSERT};",
            self.chat_values(&extraction.chat)
        );

        for batch in extraction.messages.chunks(INSERT_BATCH) {
            let rows: Vec<String> = batch
                .iter()
                .map(|m| format!("    ({})", self.message_values(&extraction.chat.slug, m)))
                .collect();
            let _ = writeln!(
                sql,
                "INSERT INTO messages ({MESSAGE_COLUMNS})\nVALUES\n{}\nON CONFLICT DO NOTHING;",
                rows.join(",\n")
            );
        }

        let _ = writeln!(sql, "COMMIT;");
        sql
    }

    /// Renders the schema followed by the insert scripts of every extraction.
    pub fn render(&self, extractions: &[Extraction]) -> String {
        let mut sql = self.schema();
        for extraction in extractions {
            sql.push('\n');
            sql.push_str(&self.insert_script(extraction));
        }
        sql
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::Sqlite, true) => "1",
            (Dialect::Sqlite, false) => "0",
            (Dialect::Postgres, true) => "TRUE",
            (Dialect::Postgres, false) => "FALSE",
        }
    }

    fn opt_bool(&self, value: Option<bool>) -> String {
        value.map_or_else(|| "NULL".to_string(), |v| self.bool_literal(v).to_string())
    }

    fn chat_values(&self, chat: &Chat) -> String {
        [
            quote(&chat.slug),
            opt_number(chat.id),
            quote(&chat.title),
            opt_quote(chat.link.as_deref()),
            opt_quote(chat.joined.map(|d| d.to_string()).as_deref()),
            self.bool_literal(chat.is_active).to_string(),
            self.opt_bool(chat.is_member),
            self.opt_bool(chat.is_public),
        ]
        .join(", ")
    }

    fn message_values(&self, slug: &str, message: &Message) -> String {
        [
            quote(slug),
            message.sequence_index.to_string(),
            opt_number(message.msg_id),
            quote(&message.sender_name),
            opt_quote(message.timestamp.map(|t| t.to_string()).as_deref()),
            opt_quote(message.timestamp_raw.as_deref()),
            quote(&message.text),
            opt_quote(message.media_type.map(|m| m.as_str())),
            opt_quote(message.link.as_deref()),
        ]
        .join(", ")
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ChatvaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            other => Err(ChatvaultError::invalid_config(
                "sql_dialect",
                format!("unknown dialect '{other}' (expected sqlite or postgres)"),
            )),
        }
    }
}

/// Single-quoted SQL string literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn opt_quote(value: Option<&str>) -> String {
    value.map_or_else(|| "NULL".to_string(), quote)
}

fn opt_number<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| v.to_string())
}
