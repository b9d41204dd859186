//! Anchor-priority lists.
//!
//! An [`Anchor`] is a `(locate, read)` pair: `locate` finds a candidate
//! element from a scope (the document, a chat section, a message row) and
//! `read` pulls a value out of it. Lists are evaluated in priority order by
//! [`resolve`]; the first anchor that yields a non-empty value wins.
//!
//! Each list below documents which export version it targets, so adding a
//! new client layout means appending an entry rather than growing a chain of
//! conditionals.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::DomNode;

/// Trailing "(joined the group ...)" note in table captions, whatever its date looks like.
pub(crate) static JOINED_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*(?:\(\s*joined the group\b[^)]*\)|joined the group\s*\d{1,2}[./]\d{1,2}[./]\d{2,4})",
    )
    .expect("joined note regex is valid")
});

/// Date inside the joined note: `12.05.2023`, `12/05/2023`, `12.05.23`.
pub(crate) static JOINED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)joined the group\s*(?P<date>\d{1,2}[./]\d{1,2}[./]\d{2,4})")
        .expect("joined date regex is valid")
});

/// A structural pattern that locates one field.
pub struct Anchor<N> {
    name: &'static str,
    locate: fn(&N) -> Option<N>,
    read: fn(&N) -> Option<String>,
}

impl<N> Clone for Anchor<N> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            locate: self.locate,
            read: self.read,
        }
    }
}

impl<N> std::fmt::Debug for Anchor<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anchor").field("name", &self.name).finish()
    }
}

impl<N: DomNode> Anchor<N> {
    /// Creates an anchor from a locator and a reader.
    pub const fn new(
        name: &'static str,
        locate: fn(&N) -> Option<N>,
        read: fn(&N) -> Option<String>,
    ) -> Self {
        Self { name, locate, read }
    }

    /// Anchor name, used in logs and [`Resolved::anchor`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Applies the anchor to `scope`; `None` unless it yields a non-empty value.
    pub fn apply(&self, scope: &N) -> Option<(N, String)> {
        let node = (self.locate)(scope)?;
        let value = (self.read)(&node)?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some((node, value.to_string()))
    }
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone)]
pub struct Resolved<N> {
    /// Name of the anchor that matched
    pub anchor: &'static str,
    /// The located element
    pub node: N,
    /// The non-empty, trimmed value
    pub value: String,
}

/// Evaluates `anchors` in order against `scope`; first non-empty match wins.
pub fn resolve<N: DomNode>(anchors: &[Anchor<N>], scope: &N) -> Option<Resolved<N>> {
    anchors.iter().find_map(|anchor| {
        anchor.apply(scope).map(|(node, value)| Resolved {
            anchor: anchor.name,
            node,
            value,
        })
    })
}

// ============================================================================
// Shared readers
// ============================================================================

fn read_text<N: DomNode>(node: &N) -> Option<String> {
    Some(node.text())
}

fn read_title_attr<N: DomNode>(node: &N) -> Option<String> {
    node.attribute("title").map(str::to_owned)
}

fn read_href<N: DomNode>(node: &N) -> Option<String> {
    node.attribute("href").map(str::to_owned)
}

/// Quoted (forwarded / reply) blocks inside a desktop message row.
fn is_nested_block<N: DomNode>(node: &N) -> bool {
    node.has_class("forwarded") || node.has_class("reply_to")
}

fn find_in_row<N: DomNode>(row: &N, class: &str) -> Option<N> {
    row.find_pruned(|n| n.has_class(class), is_nested_block)
}

fn table_cells<N: DomNode>(row: &N) -> Vec<N> {
    row.children_named("td")
}

fn cell_with_class<N: DomNode>(row: &N, class: &str) -> Option<N> {
    table_cells(row).into_iter().find(|cell| cell.has_class(class))
}

/// Positional cell lookup: 3 cells = id | date | text, 4 = id | date | sender | text.
/// A 3-cell row has no sender cell, so it always continues the previous sender.
fn cell_at<N: DomNode>(row: &N, column: Column) -> Option<N> {
    let cells = table_cells(row);
    let index = match (column, cells.len()) {
        (Column::Id, n) if n >= 3 => 0,
        (Column::Date, n) if n >= 3 => 1,
        (Column::Sender, n) if n >= 4 => 2,
        (Column::Text, n) if n >= 3 => n - 1,
        _ => return None,
    };
    cells.into_iter().nth(index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Date,
    Sender,
    Text,
}

// ============================================================================
// Chat title
// ============================================================================

/// Caption text with the "joined the group" note removed.
fn read_caption_title<N: DomNode>(node: &N) -> Option<String> {
    let text = node.text();
    Some(JOINED_NOTE.replace_all(&text, "").trim().to_string())
}

/// Title anchors, highest priority first.
///
/// 1. Desktop `div.page_header` → `.text.bold` (current clients)
/// 2. Desktop `div.page_header` → `.text` (older clients without `bold`)
/// 3. Table `<caption>` → `<a>` (archive tool, linked chats)
/// 4. Table `<caption>` text (archive tool, unlinked chats)
/// 5. First `<h1>` (hand-edited or third-party exports)
pub fn title_anchors<N: DomNode>() -> Vec<Anchor<N>> {
    vec![
        Anchor::new(
            "page_header_bold",
            |scope: &N| {
                scope
                    .find(|n| n.has_class("page_header"))?
                    .find(|n| n.has_classes(&["text", "bold"]))
            },
            read_text,
        ),
        Anchor::new(
            "page_header_text",
            |scope: &N| scope.find(|n| n.has_class("page_header"))?.find(|n| n.has_class("text")),
            read_text,
        ),
        Anchor::new(
            "caption_link",
            |scope: &N| caption(scope)?.find(|n| n.name() == "a"),
            read_caption_title,
        ),
        Anchor::new("caption", caption, read_caption_title),
        Anchor::new("h1", |scope: &N| scope.find(|n| n.name() == "h1"), read_text),
    ]
}

/// The section's own `<caption>`, or the first one below it.
pub(crate) fn caption<N: DomNode>(scope: &N) -> Option<N> {
    if scope.name() == "table" {
        return scope.children_named("caption").into_iter().next();
    }
    scope.find(|n| n.name() == "caption")
}

// ============================================================================
// Message rows
// ============================================================================

/// Anchor lists for every field of a message row.
#[derive(Debug, Clone)]
pub struct RowAnchors<N> {
    /// Author display name
    pub sender: Vec<Anchor<N>>,
    /// Raw timestamp string
    pub timestamp: Vec<Anchor<N>>,
    /// Body text
    pub body: Vec<Anchor<N>>,
    /// Media classification label (see [`MediaType`](crate::MediaType))
    pub media: Vec<Anchor<N>>,
    /// Numeric message id
    pub msg_id: Vec<Anchor<N>>,
    /// Permalink
    pub link: Vec<Anchor<N>>,
}

/// Sender text without the trailing "via @bot" details span.
fn read_sender<N: DomNode>(node: &N) -> Option<String> {
    let mut name = node.text();
    for details in node.find_all(|n| n.has_class("details")) {
        let suffix = details.text();
        if let Some(stripped) = name.strip_suffix(suffix.as_str()) {
            name = stripped.trim_end().to_string();
        }
    }
    Some(name)
}

/// `message123` → `123`.
fn read_row_id<N: DomNode>(row: &N) -> Option<String> {
    let id = row.attribute("id")?.strip_prefix("message")?;
    id.chars().all(|c| c.is_ascii_digit()).then(|| id.to_string())
}

/// Id cell text, accepted when it is 1-10 digits.
fn read_id_cell<N: DomNode>(cell: &N) -> Option<String> {
    let text = cell.text();
    let valid = (1..=10).contains(&text.len()) && text.chars().all(|c| c.is_ascii_digit());
    valid.then_some(text)
}

/// Media wrapper classes → media label, checked in order.
const MEDIA_CLASSES: &[(&str, &str)] = &[
    ("media_voice_message", "voice_message"),
    ("media_video_message", "video_message"),
    ("round_video", "video_message"),
    ("photo_wrap", "photo"),
    ("media_photo", "photo"),
    ("video_file_wrap", "video"),
    ("media_video", "video"),
    ("animated_wrap", "animation"),
    ("media_animation", "animation"),
    ("media_audio_file", "audio"),
    ("sticker_wrap", "sticker"),
    ("media_sticker", "sticker"),
    ("media_file", "file"),
    ("media_contact", "contact"),
    ("media_location", "location"),
    ("media_live_location", "location"),
    ("media_venue", "location"),
    ("media_poll", "poll"),
    ("media_game", "game"),
    ("media_invoice", "invoice"),
];

fn classify_media<N: DomNode>(wrap: &N) -> Option<String> {
    let mut candidates = vec![wrap.clone()];
    candidates.extend(wrap.find_all(|_| true));

    for (class, label) in MEDIA_CLASSES {
        if candidates.iter().any(|n| n.has_class(class)) {
            return Some((*label).to_string());
        }
    }
    Some("other".to_string())
}

/// Desktop (`div.message`) row anchors.
pub fn desktop_row_anchors<N: DomNode>() -> RowAnchors<N> {
    RowAnchors {
        sender: vec![Anchor::new(
            "from_name",
            |row: &N| find_in_row(row, "from_name"),
            read_sender,
        )],
        timestamp: vec![
            Anchor::new("date_title", |row: &N| find_in_row(row, "date"), read_title_attr),
            Anchor::new("date_text", |row: &N| find_in_row(row, "date"), read_text),
        ],
        body: vec![Anchor::new("text", |row: &N| find_in_row(row, "text"), read_text)],
        media: vec![Anchor::new(
            "media_wrap",
            |row: &N| find_in_row(row, "media_wrap"),
            classify_media,
        )],
        msg_id: vec![Anchor::new("row_id", |row: &N| Some(row.clone()), read_row_id)],
        link: Vec::new(),
    }
}

/// Table (`<tr>`) row anchors: class-marked cells first, positions second.
pub fn table_row_anchors<N: DomNode>() -> RowAnchors<N> {
    RowAnchors {
        sender: vec![
            Anchor::new("from_name_cell", |row: &N| cell_with_class(row, "from_name"), read_sender),
            Anchor::new("sender_column", |row: &N| cell_at(row, Column::Sender), read_sender),
        ],
        timestamp: vec![
            Anchor::new("date_cell_title", |row: &N| cell_with_class(row, "date"), read_title_attr),
            Anchor::new("date_cell", |row: &N| cell_with_class(row, "date"), read_text),
            Anchor::new("date_column", |row: &N| cell_at(row, Column::Date), read_text),
        ],
        body: vec![
            Anchor::new("text_cell", |row: &N| cell_with_class(row, "text"), read_text),
            Anchor::new("text_column", |row: &N| cell_at(row, Column::Text), read_text),
        ],
        media: Vec::new(),
        msg_id: vec![
            Anchor::new("msg_id_cell", |row: &N| cell_with_class(row, "msg_id"), read_id_cell),
            Anchor::new("id_column", |row: &N| cell_at(row, Column::Id), read_id_cell),
        ],
        link: vec![
            Anchor::new(
                "msg_id_cell_link",
                |row: &N| cell_with_class(row, "msg_id")?.find(|n| n.name() == "a"),
                read_href,
            ),
            Anchor::new(
                "id_column_link",
                |row: &N| cell_at(row, Column::Id)?.find(|n| n.name() == "a"),
                read_href,
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, ScraperNode};

    fn title_of(html: &str) -> Option<(String, &'static str)> {
        let doc = Document::parse(html.as_bytes()).unwrap();
        let anchors = title_anchors::<ScraperNode<'_>>();
        resolve(&anchors, &doc.root()).map(|r| (r.value, r.anchor))
    }

    #[test]
    fn test_title_primary_anchor() {
        let html = r#"<div class="page_header"><div class="content">
            <div class="text bold">Dev Team</div></div></div>"#;
        assert_eq!(title_of(html), Some(("Dev Team".into(), "page_header_bold")));
    }

    #[test]
    fn test_title_secondary_anchor() {
        let html = r#"<div class="page_header"><div class="text">Project Chat</div></div>"#;
        assert_eq!(title_of(html), Some(("Project Chat".into(), "page_header_text")));
    }

    #[test]
    fn test_title_empty_primary_falls_through() {
        let html = r#"<div class="page_header"><div class="text bold">  </div></div>
            <h1>Fallback</h1>"#;
        assert_eq!(title_of(html), Some(("Fallback".into(), "h1")));
    }

    #[test]
    fn test_title_caption_strips_joined_note() {
        let html = r#"<table><caption><a href="https://t.me/rustaceans">Rustaceans</a>
            (joined the group 12.05.2023)</caption><tr><td>1</td></tr></table>"#;
        assert_eq!(title_of(html), Some(("Rustaceans".into(), "caption_link")));

        let html = r#"<table><caption>Book Club (joined the group 01.02.2022)</caption></table>"#;
        assert_eq!(title_of(html), Some(("Book Club".into(), "caption")));

        let html = r#"<table><caption>Book Club (joined the group 1/2/22)</caption></table>"#;
        assert_eq!(title_of(html), Some(("Book Club".into(), "caption")));
    }

    #[test]
    fn test_title_none() {
        assert_eq!(title_of("<div><p>no header</p></div>"), None);
    }

    #[test]
    fn test_media_classification() {
        let html = r#"
            <div class="message" id="m1"><div class="media_wrap"><a class="photo_wrap"></a></div></div>
            <div class="message" id="m2"><div class="media_wrap"><a class="media_clearfix media_voice_message"></a></div></div>
            <div class="message" id="m3"><div class="media_wrap"><div class="mystery"></div></div></div>
            <div class="message" id="m4"><div class="text">plain</div></div>"#;
        let doc = Document::parse(html.as_bytes()).unwrap();
        let anchors = desktop_row_anchors::<ScraperNode<'_>>();
        let labels: Vec<_> = doc
            .root()
            .find_all(|n| n.has_class("message"))
            .iter()
            .map(|row| resolve(&anchors.media, row).map(|r| r.value))
            .collect();
        assert_eq!(
            labels,
            [
                Some("photo".to_string()),
                Some("voice_message".to_string()),
                Some("other".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_sender_strips_via_bot() {
        let html = r#"<div class="message" id="message7"><div class="from_name">Alice
            <span class="details">via @gif</span></div></div>"#;
        let doc = Document::parse(html.as_bytes()).unwrap();
        let row = doc.root().find(|n| n.has_class("message")).unwrap();
        let anchors = desktop_row_anchors();
        assert_eq!(resolve(&anchors.sender, &row).unwrap().value, "Alice");
        assert_eq!(resolve(&anchors.msg_id, &row).unwrap().value, "7");
    }

    #[test]
    fn test_table_positional_cells() {
        let html = r#"<table><tbody>
            <tr><td><a href="https://t.me/c/1/42">42</a></td><td>09:00:00 12.05.2023</td><td>hello</td></tr>
            <tr><td>43</td><td>09:01:00 12.05.2023</td><td>Bob</td><td>hi</td></tr>
        </tbody></table>"#;
        let doc = Document::parse(html.as_bytes()).unwrap();
        let rows = doc.root().find_all(|n| n.name() == "tr");
        let anchors = table_row_anchors();

        assert!(resolve(&anchors.sender, &rows[0]).is_none());
        assert_eq!(resolve(&anchors.body, &rows[0]).unwrap().value, "hello");
        assert_eq!(resolve(&anchors.link, &rows[0]).unwrap().value, "https://t.me/c/1/42");
        assert_eq!(resolve(&anchors.msg_id, &rows[0]).unwrap().value, "42");

        assert_eq!(resolve(&anchors.sender, &rows[1]).unwrap().value, "Bob");
        assert_eq!(resolve(&anchors.body, &rows[1]).unwrap().value, "hi");
        assert!(resolve(&anchors.link, &rows[1]).is_none());
    }

    #[test]
    fn test_table_class_cells_win() {
        let html = r#"<table><tr>
            <td class="text">body first</td><td class="msg_id">5</td>
            <td class="from_name">Carol</td><td class="date">12.05.2023 10:00</td>
        </tr></table>"#;
        let doc = Document::parse(html.as_bytes()).unwrap();
        let row = doc.root().find(|n| n.name() == "tr").unwrap();
        let anchors = table_row_anchors();
        assert_eq!(resolve(&anchors.sender, &row).unwrap().anchor, "from_name_cell");
        assert_eq!(resolve(&anchors.body, &row).unwrap().value, "body first");
        assert_eq!(resolve(&anchors.timestamp, &row).unwrap().value, "12.05.2023 10:00");
        assert_eq!(resolve(&anchors.msg_id, &row).unwrap().value, "5");
    }
}
