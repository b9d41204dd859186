//! Message extractor.
//!
//! Walks the message rows of a scope in document order and yields one
//! [`Message`] per row. The walk is lazy and single-pass: rows are located up
//! front, but fields are only read as the iterator advances.
//!
//! Rows without a sender continue the previous sender (Telegram collapses
//! consecutive messages from one author). The first row has nothing to
//! continue, so a missing sender there is fatal and ends the iteration.

use std::iter::FusedIterator;

use super::anchor::{RowAnchors, desktop_row_anchors, resolve, table_row_anchors};
use crate::Message;
use crate::dom::DomNode;
use crate::error::{ChatvaultError, Result};
use crate::normalize::{Confidence, TimeNormalizer};

/// Structural layout of the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Telegram Desktop: one `div.message` per row
    Desktop,
    /// Archive table: one `<tr>` per row
    Table,
}

impl Layout {
    /// Picks the layout for `scope`: desktop rows win when present.
    pub fn detect<N: DomNode>(scope: &N) -> Self {
        if scope.find(is_desktop_row).is_some() {
            Layout::Desktop
        } else {
            Layout::Table
        }
    }

    fn rows<N: DomNode>(self, scope: &N) -> Vec<N> {
        match self {
            Layout::Desktop => scope.find_all(is_desktop_row),
            Layout::Table => scope.find_all(|n| n.name() == "tr"),
        }
    }

    /// Structural non-message rows: date dividers, service rows, headers.
    fn is_artifact<N: DomNode>(self, row: &N) -> bool {
        match self {
            Layout::Desktop => row.has_class("service"),
            Layout::Table => {
                row.has_class("service")
                    || row.has_class("date")
                    || !row.children_named("th").is_empty()
                    || row.children_named("td").len() < 3
            }
        }
    }
}

fn is_desktop_row<N: DomNode>(node: &N) -> bool {
    node.name() == "div" && node.has_class("message")
}

/// Lazy iterator over the messages of one scope.
pub struct MessageExtractor<'a, N> {
    rows: std::vec::IntoIter<N>,
    layout: Layout,
    anchors: RowAnchors<N>,
    time: &'a TimeNormalizer,
    locale_hint: Option<&'a str>,
    row: usize,
    next_index: usize,
    last_sender: Option<String>,
    failed: bool,
}

impl<'a, N: DomNode> MessageExtractor<'a, N> {
    /// Locates the message rows under `scope`.
    pub fn new(scope: &N, time: &'a TimeNormalizer, locale_hint: Option<&'a str>) -> Self {
        let layout = Layout::detect(scope);
        let anchors = match layout {
            Layout::Desktop => desktop_row_anchors(),
            Layout::Table => table_row_anchors(),
        };
        let rows = layout.rows(scope);
        tracing::debug!(?layout, rows = rows.len(), "located message rows");

        Self {
            rows: rows.into_iter(),
            layout,
            anchors,
            time,
            locale_hint,
            row: 0,
            next_index: 0,
            last_sender: None,
            failed: false,
        }
    }

    /// Layout detected for this scope.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn build(&mut self, row: &N, rank: usize) -> Result<Message> {
        let sender_name = match resolve(&self.anchors.sender, row) {
            Some(sender) => {
                self.last_sender = Some(sender.value.clone());
                sender.value
            }
            None => self
                .last_sender
                .clone()
                .ok_or(ChatvaultError::MissingFirstSender { row: rank })?,
        };

        let mut message = Message::new(self.next_index, sender_name, String::new());

        if let Some(raw) = resolve(&self.anchors.timestamp, row).map(|r| r.value) {
            let normalized = self.time.normalize(&raw, self.locale_hint);
            match normalized.confidence {
                Confidence::Exact => {}
                Confidence::Heuristic => {
                    tracing::debug!(row = rank, raw = %raw, "timestamp resolved heuristically");
                }
                Confidence::Ambiguous => {
                    tracing::warn!(row = rank, raw = %raw, "ambiguous day/month order, applied date order policy");
                }
                Confidence::Unparsed => {
                    tracing::warn!(row = rank, raw = %raw, "unparsable timestamp, keeping raw value");
                }
            }
            message.timestamp = normalized.timestamp;
            message.timestamp_raw = Some(raw);
        } else {
            tracing::debug!(row = rank, "row has no timestamp");
        }

        message.text = resolve(&self.anchors.body, row)
            .map(|r| r.value)
            .unwrap_or_default();
        message.media_type = resolve(&self.anchors.media, row).and_then(|r| r.value.parse().ok());
        message.msg_id = resolve(&self.anchors.msg_id, row).and_then(|r| r.value.parse().ok());
        message.link = resolve(&self.anchors.link, row).map(|r| r.value);

        Ok(message)
    }
}

impl<N: DomNode> Iterator for MessageExtractor<'_, N> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let row = self.rows.next()?;
            let rank = self.row;
            self.row += 1;

            if self.layout.is_artifact(&row) {
                tracing::trace!(row = rank, "skipping non-message row");
                continue;
            }

            return match self.build(&row, rank) {
                Ok(message) => {
                    self.next_index += 1;
                    Some(Ok(message))
                }
                Err(e) => {
                    self.failed = true;
                    Some(Err(e))
                }
            };
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.rows.len()))
        }
    }
}

impl<N: DomNode> FusedIterator for MessageExtractor<'_, N> {}
