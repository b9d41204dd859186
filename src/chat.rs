//! Chat records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ChatAttributes;
use crate::extract::ChatMetadata;

/// A chat, as handed to writers.
///
/// `slug` is a pure function of `title`; the id and flags come from the
/// operator. `is_member` and `is_public` are only meaningful for active chats
/// and are `None` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Operator-supplied external id.
    #[serde(default)]
    pub id: Option<i64>,

    /// URL/filesystem-safe identifier derived from `title`.
    pub slug: String,

    /// Display name as found in the export.
    pub title: String,

    /// Public link to the chat (table exports only).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub link: Option<String>,

    /// Date the exporting account joined the chat (table exports only).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub joined: Option<NaiveDate>,

    /// Whether the chat is still active.
    pub is_active: bool,

    /// Whether the operator is a member; `None` for inactive chats.
    #[serde(default)]
    pub is_member: Option<bool>,

    /// Whether the chat is public; `None` for inactive chats.
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl Chat {
    /// Combines extracted metadata, a slug and operator attributes.
    pub fn new(metadata: ChatMetadata, slug: String, attrs: &ChatAttributes) -> Self {
        let when_active = |flag: bool| attrs.is_active.then_some(flag);
        Self {
            id: attrs.id,
            slug,
            title: metadata.title,
            link: metadata.link,
            joined: metadata.joined,
            is_active: attrs.is_active,
            is_member: when_active(attrs.is_member),
            is_public: when_active(attrs.is_public),
        }
    }
}
