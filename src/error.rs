//! Unified error types for chatvault.
//!
//! A single [`ChatvaultError`] enum covers every failure in the crate. Only
//! three variants can come out of the extraction core, and all three abort a
//! run before anything is handed to a writer:
//!
//! - [`MalformedDocument`](ChatvaultError::MalformedDocument) - input is not HTML at all
//! - [`MissingChatTitle`](ChatvaultError::MissingChatTitle) - no title anchor matched
//! - [`MissingFirstSender`](ChatvaultError::MissingFirstSender) - the first message has no author
//!
//! The remaining variants belong to the collaborators around the core
//! (page discovery, JSON and SQL writers, CLI parsing).
//!
//! Field-level problems (an unparsable timestamp, an empty body) are never
//! errors; they degrade to `None` values on the record.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatvault operations.
///
/// # Example
///
/// ```rust
/// use chatvault::error::Result;
/// use chatvault::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatvaultError>;

/// The error type for all chatvault operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatvaultError {
    /// The input could not be treated as an HTML document.
    ///
    /// Raised for invalid UTF-8, empty input, or input without any markup.
    /// Missing individual elements are not malformed documents.
    #[error("Malformed document: {reason}")]
    MalformedDocument {
        /// Why the input was rejected
        reason: String,
    },

    /// None of the chat title anchors produced a non-empty title.
    #[error("No chat title found: none of the known header anchors matched")]
    MissingChatTitle,

    /// The first message row carries no sender element.
    ///
    /// Later rows may inherit the previous sender; the first one cannot.
    #[error("First message (row {row}) has no sender")]
    MissingFirstSender {
        /// Document-order rank of the offending row
        row: usize,
    },

    /// An I/O error occurred while reading pages or writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[cfg(feature = "json-output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error from the relational writer.
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Input selection failed (no pages, wrong extension, ...).
    #[error("Invalid input{}: {message}", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    InvalidInput {
        /// Description of what's wrong
        message: String,
        /// The offending path, if any
        path: Option<PathBuf>,
    },

    /// An operator chat id is already bound to a different chat.
    #[error("Chat id {chat_id} already belongs to chat '{existing_slug}'")]
    ChatIdConflict {
        /// The conflicting chat id
        chat_id: i64,
        /// Slug of the chat that already owns the id
        existing_slug: String,
    },

    /// A configuration value could not be parsed.
    #[error("Invalid value for {field}: {message}")]
    InvalidConfig {
        /// Name of the offending setting
        field: &'static str,
        /// Description of what's wrong
        message: String,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatvaultError {
    /// Creates a malformed document error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        ChatvaultError::MalformedDocument {
            reason: reason.into(),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        ChatvaultError::InvalidInput {
            message: message.into(),
            path,
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        ChatvaultError::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` for the errors that abort an extraction run.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ChatvaultError::MalformedDocument { .. }
                | ChatvaultError::MissingChatTitle
                | ChatvaultError::MissingFirstSender { .. }
        )
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatvaultError::Io(_))
    }

    /// Returns `true` if this is a malformed document error.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ChatvaultError::MalformedDocument { .. })
    }

    /// Returns `true` if this is an invalid input error.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ChatvaultError::InvalidInput { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
