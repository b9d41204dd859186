//! Writers for finished extractions.
//!
//! - [`write_json`] / [`to_json`] - per-chat JSON snapshot, plus the `chats.json`
//!   index ([`update_chat_index`]) - requires `json-output` feature
//! - [`Dialect`] - SQLite / PostgreSQL schema and insert scripts
//! - [`SqliteWriter`] - transactional SQLite import - requires `sqlite` feature
//!
//! Writers only ever receive complete [`Extraction`](crate::core::Extraction)s;
//! a failed run never reaches them.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "json-output", feature = "sqlite"))]
//! # fn main() -> chatvault::Result<()> {
//! use chatvault::config::{ChatAttributes, ExtractConfig};
//! use chatvault::core::output::{Dialect, SqliteWriter, update_chat_index, write_json};
//! use chatvault::core::Pipeline;
//!
//! let html = std::fs::read("export/messages.html")?;
//! let extraction = Pipeline::new(ExtractConfig::default())?
//!     .run(&html, &ChatAttributes::default())?;
//!
//! write_json(&extraction, "data/json")?;
//! update_chat_index("data/json", &[extraction.chat.clone()])?;
//!
//! SqliteWriter::open("data/chats.sqlite")?.write(&extraction)?;
//!
//! // Or render a script for psql
//! let script = Dialect::Postgres.render(&[extraction]);
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "json-output", feature = "sqlite")))]
//! # fn main() {}
//! ```

#[cfg(feature = "json-output")]
mod json_writer;
mod sql;
#[cfg(feature = "sqlite")]
mod sqlite_writer;

#[cfg(feature = "json-output")]
pub use json_writer::{CHAT_INDEX_FILE, read_chat_index, to_json, update_chat_index, write_json};
pub use sql::Dialect;
#[cfg(feature = "sqlite")]
pub use sqlite_writer::{SqliteWriter, WriteStats};
