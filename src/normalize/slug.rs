//! Title → URL-safe slug.
//!
//! Cyrillic letters go through a fixed Ukrainian/Russian romanization table;
//! any other non-ASCII letter falls back to [`deunicode_char`]. Everything that
//! is not an ASCII letter or digit afterwards becomes a single hyphen.

use std::collections::HashMap;
use std::sync::OnceLock;

use deunicode::deunicode_char;
use sha2::{Digest, Sha256};

/// Fixed romanization table (Ukrainian national system, Russian letters added).
const CYRILLIC: &[(char, &str)] = &[
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "h"), ('ґ', "g"), ('д', "d"), ('е', "e"),
    ('є', "ie"), ('ж', "zh"), ('з', "z"), ('и', "y"), ('і', "i"), ('ї', "i"), ('й', "y"),
    ('к', "k"), ('л', "l"), ('м', "m"), ('н', "n"), ('о', "o"), ('п', "p"), ('р', "r"),
    ('с', "s"), ('т', "t"), ('у', "u"), ('ф', "f"), ('х', "kh"), ('ц', "ts"), ('ч', "ch"),
    ('ш', "sh"), ('щ', "shch"), ('ь', ""), ('ю', "iu"), ('я', "ia"),
    ('ё', "io"), ('ы', "y"), ('э', "e"), ('ъ', ""),
];

/// Prefix used when a title has no sluggable characters at all.
const FALLBACK_PREFIX: &str = "chat";

/// Derives deterministic slugs from chat titles.
///
/// The output is lowercase ASCII matching `^[a-z0-9]+(-[a-z0-9]+)*$` and is
/// never empty.
#[derive(Debug, Clone)]
pub struct SlugNormalizer {
    table: HashMap<char, &'static str>,
    max_words: Option<usize>,
}

impl Default for SlugNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SlugNormalizer {
    /// Creates a normalizer with no word cap.
    pub fn new() -> Self {
        Self {
            table: CYRILLIC.iter().copied().collect(),
            max_words: None,
        }
    }

    /// Keeps at most `words` hyphen-separated words. Zero means no cap.
    #[must_use]
    pub fn with_max_words(mut self, words: usize) -> Self {
        self.max_words = (words > 0).then_some(words);
        self
    }

    /// Slugifies `title`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatvault::normalize::SlugNormalizer;
    ///
    /// let slugs = SlugNormalizer::new();
    /// assert_eq!(slugs.normalize("Dev Team"), "dev-team");
    /// assert_eq!(slugs.normalize("Чат №1"), "chat-1");
    /// assert_eq!(slugs.normalize("Київ — це ми!"), "kyiv-tse-my");
    /// ```
    pub fn normalize(&self, title: &str) -> String {
        let mut slug = String::with_capacity(title.len());
        let mut pending_hyphen = false;

        for c in title.to_lowercase().chars() {
            if c == '\'' || c == '\u{2019}' || c == '\u{02bc}' || is_combining_mark(c) {
                continue;
            }

            let romanized: Option<&str> = if c.is_ascii_alphanumeric() {
                None
            } else if let Some(mapped) = self.table.get(&c) {
                Some(*mapped)
            } else if c.is_alphanumeric() {
                deunicode_char(c)
            } else {
                Some("-")
            };

            let mut push = |ch: char| {
                if ch.is_ascii_alphanumeric() {
                    if pending_hyphen && !slug.is_empty() {
                        slug.push('-');
                    }
                    pending_hyphen = false;
                    slug.push(ch.to_ascii_lowercase());
                } else {
                    pending_hyphen = true;
                }
            };

            match romanized {
                None => push(c),
                Some(text) => text.chars().for_each(&mut push),
            }
        }

        if let Some(max) = self.max_words {
            if let Some((cut, _)) = slug.match_indices('-').nth(max - 1) {
                slug.truncate(cut);
            }
        }

        if slug.is_empty() {
            return fallback_slug(title);
        }
        slug
    }
}

/// Combining diacritics, such as the dot `İ` leaves behind after lowercasing.
fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036f}'
            | '\u{1ab0}'..='\u{1aff}'
            | '\u{1dc0}'..='\u{1dff}'
            | '\u{20d0}'..='\u{20ff}'
            | '\u{fe20}'..='\u{fe2f}'
    )
}

/// `chat-` followed by the first 8 hex digits of the title's SHA-256.
fn fallback_slug(title: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    let hex: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!("{FALLBACK_PREFIX}-{hex}")
}

/// Slugifies `title` with a shared default [`SlugNormalizer`].
pub fn normalize_slug(title: &str) -> String {
    static DEFAULT: OnceLock<SlugNormalizer> = OnceLock::new();
    DEFAULT.get_or_init(SlugNormalizer::new).normalize(title)
}
