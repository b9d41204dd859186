//! Document loader.

use scraper::Html;

use super::ScraperNode;
use crate::error::{ChatvaultError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A parsed HTML export (one page or several pages concatenated in order).
pub struct Document {
    html: Html,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("errors", &self.html.errors.len())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Parses raw export bytes.
    ///
    /// html5ever recovers from almost anything, so only input that is not
    /// markup at all is rejected: invalid UTF-8, empty input, or text with
    /// no tags. Missing elements are left to the extractors.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatvault::dom::{Document, DomNode};
    ///
    /// let doc = Document::parse(b"<div class=\"page_header\">Dev Team</div>")?;
    /// assert!(doc.root().find(|n| n.has_class("page_header")).is_some());
    ///
    /// assert!(Document::parse(b"   ").is_err());
    /// # Ok::<(), chatvault::ChatvaultError>(())
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ChatvaultError::malformed(format!(
                "input is not valid UTF-8 (at byte {})",
                e.valid_up_to()
            ))
        })?;
        Self::parse_str(text)
    }

    /// Parses an export that is already text.
    pub fn parse_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(ChatvaultError::malformed("input is empty"));
        }
        if !looks_like_markup(text) {
            return Err(ChatvaultError::malformed("input contains no HTML markup"));
        }

        let html = Html::parse_document(text);
        if !html.errors.is_empty() {
            tracing::debug!(count = html.errors.len(), "html5ever recovered from parse errors");
        }
        Ok(Self { html })
    }

    /// Returns the `<html>` element.
    pub fn root(&self) -> ScraperNode<'_> {
        ScraperNode::new(self.html.root_element())
    }
}

/// Returns `true` if `text` contains at least one tag-like `<x`, `</`, or `<!`.
fn looks_like_markup(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'/' || w[1] == b'!'))
}
