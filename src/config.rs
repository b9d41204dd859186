//! Configuration types for extraction runs.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! - [`ExtractConfig`] - how raw fields are normalized (locale, offset, slugs)
//! - [`ChatAttributes`] - operator-supplied chat attributes, passed through unchanged
//!
//! # Example
//!
//! ```rust
//! use chatvault::config::{ChatAttributes, ExtractConfig};
//! use chatvault::normalize::DateOrder;
//!
//! let config = ExtractConfig::new()
//!     .with_locale_hint("en-US")
//!     .with_reference_offset(3 * 3600)
//!     .with_date_order(DateOrder::DayFirst);
//!
//! let attrs = ChatAttributes::new().with_id(1001).with_public(false);
//! assert!(attrs.is_active);
//! ```

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{ChatvaultError, Result};
use crate::normalize::DateOrder;

/// Configuration for the normalizers used during extraction.
///
/// All fields have defaults that match Telegram Desktop exports made with a
/// day-first locale and a UTC reference offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Locale hint handed to the time normalizer (e.g. `"en-US"`, `"uk"`).
    #[serde(default)]
    pub locale_hint: Option<String>,

    /// Offset (seconds east of UTC) that zoned timestamps are converted to.
    #[serde(default)]
    pub reference_offset_seconds: i32,

    /// Forces the day/month order instead of deriving it from the locale hint.
    #[serde(default)]
    pub date_order: Option<DateOrder>,

    /// Caps the number of words kept in a slug (no cap by default).
    #[serde(default)]
    pub slug_max_words: Option<usize>,
}

impl ExtractConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the locale hint.
    #[must_use]
    pub fn with_locale_hint(mut self, hint: impl Into<String>) -> Self {
        self.locale_hint = Some(hint.into());
        self
    }

    /// Sets the reference offset in seconds east of UTC.
    #[must_use]
    pub fn with_reference_offset(mut self, seconds: i32) -> Self {
        self.reference_offset_seconds = seconds;
        self
    }

    /// Forces a day/month order.
    #[must_use]
    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.date_order = Some(order);
        self
    }

    /// Caps slugs at `words` words.
    #[must_use]
    pub fn with_slug_max_words(mut self, words: usize) -> Self {
        self.slug_max_words = Some(words);
        self
    }

    /// Returns the reference offset, validating its range.
    pub fn reference_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.reference_offset_seconds).ok_or_else(|| {
            ChatvaultError::invalid_config(
                "reference_offset_seconds",
                format!("{} is outside ±24h", self.reference_offset_seconds),
            )
        })
    }

    /// Returns the effective date order: the explicit override, else the
    /// order implied by the locale hint.
    pub fn effective_date_order(&self) -> DateOrder {
        DateOrder::resolve(self.date_order, self.locale_hint.as_deref())
    }
}

/// Parses an offset like `+03:00`, `-0530`, `+3` or `Z` into seconds east of UTC.
pub fn parse_offset(value: &str) -> Result<i32> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(0);
    }

    let invalid = || ChatvaultError::invalid_config("utc_offset", format!("'{value}' is not ±HH:MM"));

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(sign * (hours * 3600 + minutes * 60))
}

/// Operator-supplied chat attributes.
///
/// These never come from the document. They are passed through to the
/// [`Chat`](crate::Chat) record unchanged; `is_member` and `is_public` are
/// only recorded when the chat is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAttributes {
    /// External chat identifier, if the operator knows it.
    pub id: Option<i64>,
    /// Whether the chat is still active (default: true)
    pub is_active: bool,
    /// Whether the operator is a member (default: true)
    pub is_member: bool,
    /// Whether the chat is public (default: true)
    pub is_public: bool,
}

impl Default for ChatAttributes {
    fn default() -> Self {
        Self {
            id: None,
            is_active: true,
            is_member: true,
            is_public: true,
        }
    }
}

impl ChatAttributes {
    /// Creates attributes with the defaults (no id, everything true).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the external chat id.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// Sets the member flag.
    #[must_use]
    pub fn with_member(mut self, member: bool) -> Self {
        self.is_member = member;
        self
    }

    /// Sets the public flag.
    #[must_use]
    pub fn with_public(mut self, public: bool) -> Self {
        self.is_public = public;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_config_default() {
        let config = ExtractConfig::default();
        assert!(config.locale_hint.is_none());
        assert_eq!(config.reference_offset_seconds, 0);
        assert!(config.date_order.is_none());
        assert!(config.slug_max_words.is_none());
    }

    #[test]
    fn test_extract_config_builder() {
        let config = ExtractConfig::new()
            .with_locale_hint("en-US")
            .with_reference_offset(7200)
            .with_slug_max_words(3);

        assert_eq!(config.locale_hint.as_deref(), Some("en-US"));
        assert_eq!(config.reference_offset().unwrap().local_minus_utc(), 7200);
        assert_eq!(config.slug_max_words, Some(3));
    }

    #[test]
    fn test_effective_date_order() {
        let config = ExtractConfig::new().with_locale_hint("en-US");
        assert_eq!(config.effective_date_order(), DateOrder::MonthFirst);

        let config = config.with_date_order(DateOrder::DayFirst);
        assert_eq!(config.effective_date_order(), DateOrder::DayFirst);

        assert_eq!(ExtractConfig::new().effective_date_order(), DateOrder::DayFirst);
    }

    #[test]
    fn test_reference_offset_out_of_range() {
        let config = ExtractConfig::new().with_reference_offset(90_000);
        assert!(config.reference_offset().is_err());
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+03:00").unwrap(), 10_800);
        assert_eq!(parse_offset("-05:30").unwrap(), -19_800);
        assert_eq!(parse_offset("+0200").unwrap(), 7_200);
        assert_eq!(parse_offset("+3").unwrap(), 10_800);
        assert_eq!(parse_offset("Z").unwrap(), 0);
        assert!(parse_offset("03:00").is_err());
        assert!(parse_offset("+25:00").is_err());
        assert!(parse_offset("+ab").is_err());
    }

    #[test]
    fn test_chat_attributes_default() {
        let attrs = ChatAttributes::default();
        assert_eq!(attrs.id, None);
        assert!(attrs.is_active);
        assert!(attrs.is_member);
        assert!(attrs.is_public);
    }

    #[test]
    fn test_config_serde() {
        let config = ExtractConfig::new().with_locale_hint("uk");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ExtractConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let parsed: ExtractConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, ExtractConfig::default());
    }
}
