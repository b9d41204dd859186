//! Pipeline orchestrator.
//!
//! Sequences Document Loader → Chat Extractor → Message Extractor and
//! returns the finished records. A run is atomic: it either returns every
//! record or an error, never a partial set, so writers downstream cannot
//! persist half an export.

use serde::{Deserialize, Serialize};

use crate::config::{ChatAttributes, ExtractConfig};
use crate::dom::{Document, DomNode};
use crate::error::Result;
use crate::extract::{ChatExtractor, ChatMetadata, MessageExtractor, sections};
use crate::normalize::{SlugNormalizer, TimeNormalizer};
use crate::{Chat, Message};

/// One chat and its messages, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// The chat record
    pub chat: Chat,
    /// Messages ordered by `sequence_index`
    pub messages: Vec<Message>,
}

impl Extraction {
    /// Number of messages whose timestamp could not be normalized.
    pub fn degraded_timestamps(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_timestamp_degraded())
            .count()
    }
}

/// Extraction run configuration plus the normalizers built from it.
///
/// The normalizers' tables are built once in [`Pipeline::new`] and only read
/// afterwards; a pipeline can serve any number of runs.
///
/// # Example
///
/// ```rust
/// use chatvault::config::{ChatAttributes, ExtractConfig};
/// use chatvault::core::Pipeline;
///
/// let html = br#"
///     <div class="page_header"><div class="text bold">Dev Team</div></div>
///     <div class="history">
///       <div class="message default" id="message1">
///         <div class="pull_right date details" title="12.05.2023 09:00:00">09:00</div>
///         <div class="from_name">Alice</div>
///         <div class="text">hi</div>
///       </div>
///     </div>"#;
///
/// let pipeline = Pipeline::new(ExtractConfig::default())?;
/// let extraction = pipeline.run(html, &ChatAttributes::default())?;
///
/// assert_eq!(extraction.chat.slug, "dev-team");
/// assert_eq!(extraction.messages[0].sender_name, "Alice");
/// # Ok::<(), chatvault::ChatvaultError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ExtractConfig,
    time: TimeNormalizer,
    slugs: SlugNormalizer,
}

impl Pipeline {
    /// Builds the normalizers for `config`.
    pub fn new(config: ExtractConfig) -> Result<Self> {
        let time = TimeNormalizer::from_config(&config)?;
        let mut slugs = SlugNormalizer::new();
        if let Some(words) = config.slug_max_words {
            slugs = slugs.with_max_words(words);
        }
        Ok(Self {
            config,
            time,
            slugs,
        })
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts a single chat from raw export bytes.
    ///
    /// If the document holds several chat sections only the first is
    /// extracted; use [`run_all`](Self::run_all) for multi-chat documents.
    pub fn run(&self, html: &[u8], attrs: &ChatAttributes) -> Result<Extraction> {
        let document = Document::parse(html)?;
        self.run_document(&document, attrs)
    }

    /// Extracts a single chat from an already parsed document.
    pub fn run_document(&self, document: &Document, attrs: &ChatAttributes) -> Result<Extraction> {
        let root = document.root();
        let found = sections(&root);
        if found.len() > 1 {
            tracing::warn!(
                sections = found.len(),
                "document holds several chats, extracting the first only"
            );
        }
        let scope = found.into_iter().next().unwrap_or(root);
        self.extract(&scope, |_| *attrs)
    }

    /// Extracts every chat section of the document.
    ///
    /// `attributes` is called once per chat, with its metadata, to supply the
    /// operator attributes. Any fatal error aborts the whole run.
    pub fn run_all<F>(&self, html: &[u8], mut attributes: F) -> Result<Vec<Extraction>>
    where
        F: FnMut(&ChatMetadata) -> ChatAttributes,
    {
        let document = Document::parse(html)?;
        let root = document.root();
        sections(&root)
            .iter()
            .map(|scope| self.extract(scope, &mut attributes))
            .collect()
    }

    /// Extracts one chat from `scope` with any [`DomNode`] backend.
    pub fn extract<N, F>(&self, scope: &N, attributes: F) -> Result<Extraction>
    where
        N: DomNode,
        F: FnOnce(&ChatMetadata) -> ChatAttributes,
    {
        let metadata = ChatExtractor::new(&self.time).extract(scope)?;
        let messages = MessageExtractor::new(scope, &self.time, self.config.locale_hint.as_deref())
            .collect::<Result<Vec<_>>>()?;

        let attrs = attributes(&metadata);
        let slug = self.slugs.normalize(&metadata.title);
        let chat = Chat::new(metadata, slug, &attrs);

        let extraction = Extraction { chat, messages };
        tracing::info!(
            chat = %extraction.chat.slug,
            messages = extraction.messages.len(),
            degraded_timestamps = extraction.degraded_timestamps(),
            "extracted chat"
        );
        Ok(extraction)
    }
}
