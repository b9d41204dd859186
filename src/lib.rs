//! # chatvault
//!
//! Extracts chats and messages from Telegram HTML exports and persists them
//! as JSON snapshots or relational rows.
//!
//! ## Overview
//!
//! A Telegram export is a set of HTML pages whose markup drifts between
//! client versions. chatvault turns such a document into one [`Chat`] and
//! its ordered [`Message`]s:
//!
//! - the chat title is found through an ordered list of selector anchors,
//!   so a missing page header falls back to the table caption or `<h1>`
//! - continuation rows inherit the previous sender
//! - timestamps are normalized to one reference offset; unparseable values
//!   keep their raw text instead of failing the run
//! - chat titles become stable transliterated slugs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatvault::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let html = std::fs::read("ChatExport/messages.html")?;
//!     let pipeline = Pipeline::new(ExtractConfig::new().with_locale_hint("en-US"))?;
//!     let extraction = pipeline.run(&html, &ChatAttributes::default())?;
//!
//!     println!("{} ({} messages)", extraction.chat.slug, extraction.messages.len());
//!     for message in &extraction.messages {
//!         println!("{}: {}", message.sender_name, message.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`dom`] - HTML loading and the [`DomNode`](dom::DomNode) abstraction
//! - [`extract`] - selector anchors, chat metadata and message rows
//! - [`normalize`] - timestamp normalization and slug generation
//! - [`core`] - [`Pipeline`](core::Pipeline) and the output writers
//! - [`input`] - export page discovery
//! - [`config`] - [`ExtractConfig`](config::ExtractConfig) and operator
//!   [`ChatAttributes`](config::ChatAttributes)
//! - [`error`] - [`ChatvaultError`] and [`Result`]
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `json-output` | JSON snapshots and the chat index | yes |
//! | `sqlite` | Transactional SQLite writer | yes |
//! | `cli` | The `chatvault` binary | yes |
//! | `gen-test` | Synthetic export generator | no |

pub mod chat;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod dom;
pub mod error;
pub mod extract;
pub mod input;
pub mod message;
pub mod normalize;

pub use chat::Chat;
pub use error::{ChatvaultError, Result};
pub use message::{MediaType, Message};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatvault::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chat::Chat;
    pub use crate::message::{MediaType, Message};

    pub use crate::error::{ChatvaultError, Result};

    pub use crate::config::{ChatAttributes, ExtractConfig};

    pub use crate::core::{Dialect, Extraction, Pipeline};

    pub use crate::normalize::{Confidence, DateOrder, TimeNormalizer, Timestamp, normalize_slug};

    #[cfg(feature = "json-output")]
    pub use crate::core::{to_json, update_chat_index, write_json};

    #[cfg(feature = "sqlite")]
    pub use crate::core::SqliteWriter;
}
