//! Chat extractor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::anchor::{Anchor, JOINED_DATE, caption, resolve, title_anchors};
use crate::dom::DomNode;
use crate::error::{ChatvaultError, Result};
use crate::normalize::TimeNormalizer;

/// Chat-level facts read from the document.
///
/// Operator attributes (id, flags) are not part of this; they are merged in
/// by [`Chat::new`](crate::Chat::new).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMetadata {
    /// Non-empty chat title
    pub title: String,
    /// Chat link from the caption anchor, if present
    pub link: Option<String>,
    /// "joined the group" date from the caption, if present
    pub joined: Option<NaiveDate>,
    /// Name of the anchor that produced the title
    #[serde(skip)]
    pub anchor: &'static str,
}

/// Reads [`ChatMetadata`] from a document or chat section.
pub struct ChatExtractor<'a, N> {
    anchors: Vec<Anchor<N>>,
    time: &'a TimeNormalizer,
}

impl<'a, N: DomNode> ChatExtractor<'a, N> {
    /// Creates an extractor with the default title anchors.
    pub fn new(time: &'a TimeNormalizer) -> Self {
        Self {
            anchors: title_anchors(),
            time,
        }
    }

    /// Replaces the title anchor list.
    #[must_use]
    pub fn with_anchors(mut self, anchors: Vec<Anchor<N>>) -> Self {
        self.anchors = anchors;
        self
    }

    /// Extracts chat metadata from `scope`.
    ///
    /// Fails with [`MissingChatTitle`](ChatvaultError::MissingChatTitle) when
    /// no anchor yields a non-empty title.
    pub fn extract(&self, scope: &N) -> Result<ChatMetadata> {
        let title = resolve(&self.anchors, scope).ok_or(ChatvaultError::MissingChatTitle)?;
        tracing::debug!(anchor = title.anchor, title = %title.value, "resolved chat title");

        let caption = caption(scope);
        let link = caption
            .as_ref()
            .and_then(|c| c.find(|n| n.name() == "a"))
            .and_then(|a| a.attribute("href").map(str::to_owned))
            .filter(|href| !href.trim().is_empty());
        let joined = caption.as_ref().and_then(|c| self.joined_date(&c.text()));

        Ok(ChatMetadata {
            title: title.value,
            link,
            joined,
            anchor: title.anchor,
        })
    }

    fn joined_date(&self, caption_text: &str) -> Option<NaiveDate> {
        let raw = JOINED_DATE.captures(caption_text)?.name("date")?.as_str();
        let normalized = self.time.normalize(raw, None);
        if normalized.timestamp.is_none() {
            tracing::debug!(raw, "unparsable joined date");
        }
        normalized.timestamp.map(|ts| ts.naive().date())
    }
}
