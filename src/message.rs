//! Message records.
//!
//! A [`Message`] is one row of the export's message log, in document order.
//! Records are built once by the message extractor and never mutated
//! afterwards; writers receive them as an immutable slice.
//!
//! # Example
//!
//! ```
//! use chatvault::{MediaType, Message};
//!
//! let msg = Message::new(0, "Alice", "hi")
//!     .with_msg_id(42)
//!     .with_media_type(MediaType::Photo);
//!
//! assert_eq!(msg.sender_name(), "Alice");
//! assert!(msg.timestamp().is_none());
//!
//! let json = serde_json::to_string(&msg)?;
//! // degraded timestamps are explicit nulls, not missing keys
//! assert!(json.contains("\"timestamp\":null"));
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::normalize::Timestamp;

/// Kind of non-text attachment a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Photo,
    Video,
    Animation,
    VoiceMessage,
    VideoMessage,
    Audio,
    File,
    Sticker,
    Contact,
    Location,
    Poll,
    Game,
    Invoice,
    /// A media block of an unrecognized kind
    Other,
}

impl MediaType {
    /// All variants, in declaration order.
    pub const ALL: &'static [MediaType] = &[
        MediaType::Photo,
        MediaType::Video,
        MediaType::Animation,
        MediaType::VoiceMessage,
        MediaType::VideoMessage,
        MediaType::Audio,
        MediaType::File,
        MediaType::Sticker,
        MediaType::Contact,
        MediaType::Location,
        MediaType::Poll,
        MediaType::Game,
        MediaType::Invoice,
        MediaType::Other,
    ];

    /// Snake-case label, as stored in JSON and SQL.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Photo => "photo",
            MediaType::Video => "video",
            MediaType::Animation => "animation",
            MediaType::VoiceMessage => "voice_message",
            MediaType::VideoMessage => "video_message",
            MediaType::Audio => "audio",
            MediaType::File => "file",
            MediaType::Sticker => "sticker",
            MediaType::Contact => "contact",
            MediaType::Location => "location",
            MediaType::Poll => "poll",
            MediaType::Game => "game",
            MediaType::Invoice => "invoice",
            MediaType::Other => "other",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .iter()
            .copied()
            .find(|media| media.as_str() == s)
            .ok_or_else(|| format!("unknown media type '{s}'"))
    }
}

/// One extracted message.
///
/// | Field | Notes |
/// |-------|-------|
/// | `sequence_index` | 0-based rank in document order; strictly increasing |
/// | `msg_id` | Telegram message id, when the export carries one |
/// | `sender_name` | Raw display name; inherited from the previous row when absent |
/// | `timestamp` | `null` when unparsable |
/// | `timestamp_raw` | The string the timestamp was read from |
/// | `text` | Body; empty for media-only messages |
/// | `media_type` | Attachment kind, if any |
/// | `link` | Permalink, if the export carries one |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Position within the export.
    pub sequence_index: usize,

    /// Telegram message id.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub msg_id: Option<u64>,

    /// Author display name, never normalized.
    pub sender_name: String,

    /// Normalized timestamp; `None` when the raw string could not be parsed.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,

    /// Raw timestamp string as found in the export.
    #[serde(default)]
    pub timestamp_raw: Option<String>,

    /// Message body (may contain newlines).
    #[serde(default)]
    pub text: String,

    /// Attachment kind for media messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub media_type: Option<MediaType>,

    /// Permalink to the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub link: Option<String>,
}

impl Message {
    /// Creates a message with no timestamp, id, media or link.
    pub fn new(sequence_index: usize, sender_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sequence_index,
            msg_id: None,
            sender_name: sender_name.into(),
            timestamp: None,
            timestamp_raw: None,
            text: text.into(),
            media_type: None,
            link: None,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Sets the normalized timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the raw timestamp string.
    #[must_use]
    pub fn with_timestamp_raw(mut self, raw: impl Into<String>) -> Self {
        self.timestamp_raw = Some(raw.into());
        self
    }

    /// Sets the Telegram message id.
    #[must_use]
    pub fn with_msg_id(mut self, id: u64) -> Self {
        self.msg_id = Some(id);
        self
    }

    /// Sets the media type.
    #[must_use]
    pub fn with_media_type(mut self, media: MediaType) -> Self {
        self.media_type = Some(media);
        self
    }

    /// Sets the permalink.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the sender name.
    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    /// Returns the body text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the normalized timestamp, if any.
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// Returns `true` if a raw timestamp was present but did not parse.
    pub fn is_timestamp_degraded(&self) -> bool {
        self.timestamp.is_none() && self.timestamp_raw.is_some()
    }

    /// Returns `true` if the message has neither text nor media.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.media_type.is_none()
    }
}
