//! Timestamp normalization.
//!
//! Telegram renders timestamps differently depending on the export locale and
//! client version:
//!
//! - `12.05.2023 14:30:02` (Desktop, in the `title` of the `.date` element)
//! - `12.05.2023 14:30:02 UTC+03:00` (newer Desktop builds)
//! - `May 12, 2023 2:30:02 PM` (English locales)
//! - `2023-05-12T14:30:02+03:00` (ISO-like, archive tools)
//! - `14:30:02 12.05.2023` (hour-first, older archive scripts)
//!
//! [`TimeNormalizer::normalize`] strips a trailing zone, tries an ordered list
//! of chrono patterns (first full match wins), then falls back to a positional
//! heuristic. A string that survives neither yields `None`; it is never an error.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat,
    TimeZone, Utc,
};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::ExtractConfig;
use crate::error::Result;

/// Order of day and month in ambiguous numeric dates such as `05/06/2023`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `DD/MM/YYYY` (default; Telegram's own numeric format is day-first)
    DayFirst,
    /// `MM/DD/YYYY` (US English)
    MonthFirst,
}

/// Locale hints whose numeric dates put the month first.
const MONTH_FIRST_LOCALES: &[&str] = &["en-us", "us", "en-ph"];

impl DateOrder {
    /// Derives the date order from a locale hint such as `en-US` or `uk_UA`.
    ///
    /// Unknown or missing hints are day-first.
    pub fn from_locale_hint(hint: Option<&str>) -> Self {
        let Some(hint) = hint else {
            return DateOrder::DayFirst;
        };
        let hint = hint.trim().to_ascii_lowercase().replace('_', "-");
        if MONTH_FIRST_LOCALES.contains(&hint.as_str()) {
            DateOrder::MonthFirst
        } else {
            DateOrder::DayFirst
        }
    }

    /// Resolves the order to use: an explicit override wins, otherwise the
    /// locale hint decides.
    pub fn resolve(order_override: Option<DateOrder>, hint: Option<&str>) -> Self {
        order_override.unwrap_or_else(|| Self::from_locale_hint(hint))
    }
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateOrder::DayFirst => "day-first",
            DateOrder::MonthFirst => "month-first",
        })
    }
}

/// How a timestamp was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// A known pattern consumed the whole string.
    Exact,
    /// Resolved positionally; day and month were unambiguous.
    Heuristic,
    /// Day and month were both ≤ 12 and the date order policy decided.
    Ambiguous,
    /// Nothing matched; the timestamp is `None`.
    Unparsed,
}

/// A normalized point in time.
///
/// Strings without a zone stay naive local time (no conversion). Strings with
/// a zone are converted to the configured reference offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    /// Wall-clock time with no zone information.
    Local(NaiveDateTime),
    /// Zoned time, expressed in the reference offset.
    Zoned(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Returns the wall-clock reading (in the reference offset for zoned values).
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            Timestamp::Local(naive) => *naive,
            Timestamp::Zoned(dt) => dt.naive_local(),
        }
    }

    /// Returns the UTC instant, if the timestamp carries a zone.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Local(_) => None,
            Timestamp::Zoned(dt) => Some(dt.with_timezone(&Utc)),
        }
    }

    /// Returns `true` if the timestamp carries a zone.
    pub fn is_zoned(&self) -> bool {
        matches!(self, Timestamp::Zoned(_))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Local(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            Timestamp::Zoned(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Ok(Timestamp::Zoned(dt)),
            Err(_) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(Timestamp::Local),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Result of [`TimeNormalizer::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedTime {
    /// The resolved timestamp, `None` when unparsable.
    pub timestamp: Option<Timestamp>,
    /// How it was resolved.
    pub confidence: Confidence,
}

impl NormalizedTime {
    fn unparsed() -> Self {
        Self {
            timestamp: None,
            confidence: Confidence::Unparsed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    DateTime,
    Date,
}

/// One chrono format string in the ordered pattern list.
#[derive(Debug, Clone, Copy)]
struct Pattern {
    format: &'static str,
    kind: PatternKind,
    /// Day and month are both numeric and may be swapped (`05/06/2023`).
    swappable: bool,
}

const fn datetime(format: &'static str) -> Pattern {
    Pattern {
        format,
        kind: PatternKind::DateTime,
        swappable: false,
    }
}

const fn date(format: &'static str) -> Pattern {
    Pattern {
        format,
        kind: PatternKind::Date,
        swappable: false,
    }
}

const fn slash(format: &'static str, kind: PatternKind) -> Pattern {
    Pattern {
        format,
        kind,
        swappable: true,
    }
}

/// Unambiguous patterns, most specific first.
const PATTERNS: &[Pattern] = &[
    // ISO-like
    datetime("%Y-%m-%dT%H:%M:%S%.f"),
    datetime("%Y-%m-%d %H:%M:%S%.f"),
    datetime("%Y-%m-%dT%H:%M"),
    datetime("%Y-%m-%d %H:%M"),
    // Telegram Desktop numeric
    datetime("%d.%m.%Y %H:%M:%S"),
    datetime("%d.%m.%Y, %H:%M:%S"),
    datetime("%H:%M:%S %d.%m.%Y"),
    datetime("%d.%m.%Y %H:%M"),
    datetime("%d.%m.%Y, %H:%M"),
    datetime("%H:%M %d.%m.%Y"),
    // English month names
    datetime("%B %d, %Y %I:%M:%S %p"),
    datetime("%B %d, %Y, %I:%M:%S %p"),
    datetime("%B %d, %Y %H:%M:%S"),
    datetime("%d %B %Y %H:%M:%S"),
    datetime("%d %B %Y, %H:%M:%S"),
    datetime("%B %d, %Y %I:%M %p"),
    datetime("%B %d, %Y, %I:%M %p"),
    datetime("%d %B %Y %H:%M"),
];

/// Date-only fallbacks; they resolve to midnight.
const DATE_PATTERNS: &[Pattern] = &[
    date("%Y-%m-%d"),
    date("%d.%m.%Y"),
    date("%B %d, %Y"),
    date("%d %B %Y"),
];

const DAY_FIRST_SLASH: &[Pattern] = &[
    slash("%d/%m/%Y %I:%M:%S %p", PatternKind::DateTime),
    slash("%d/%m/%Y, %I:%M:%S %p", PatternKind::DateTime),
    slash("%d/%m/%Y %H:%M:%S", PatternKind::DateTime),
    slash("%d/%m/%Y, %H:%M:%S", PatternKind::DateTime),
    slash("%d/%m/%Y %I:%M %p", PatternKind::DateTime),
    slash("%d/%m/%Y, %I:%M %p", PatternKind::DateTime),
    slash("%d/%m/%Y %H:%M", PatternKind::DateTime),
    slash("%d/%m/%Y, %H:%M", PatternKind::DateTime),
    slash("%d/%m/%Y", PatternKind::Date),
];

const MONTH_FIRST_SLASH: &[Pattern] = &[
    slash("%m/%d/%Y %I:%M:%S %p", PatternKind::DateTime),
    slash("%m/%d/%Y, %I:%M:%S %p", PatternKind::DateTime),
    slash("%m/%d/%Y %H:%M:%S", PatternKind::DateTime),
    slash("%m/%d/%Y, %H:%M:%S", PatternKind::DateTime),
    slash("%m/%d/%Y %I:%M %p", PatternKind::DateTime),
    slash("%m/%d/%Y, %I:%M %p", PatternKind::DateTime),
    slash("%m/%d/%Y %H:%M", PatternKind::DateTime),
    slash("%m/%d/%Y, %H:%M", PatternKind::DateTime),
    slash("%m/%d/%Y", PatternKind::Date),
];

/// Month names recognized by the heuristic (English, Russian, Ukrainian;
/// nominative and genitive).
const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1), ("jan", 1), ("february", 2), ("feb", 2), ("march", 3), ("mar", 3),
    ("april", 4), ("apr", 4), ("may", 5), ("june", 6), ("jun", 6), ("july", 7), ("jul", 7),
    ("august", 8), ("aug", 8), ("september", 9), ("sep", 9), ("sept", 9), ("october", 10),
    ("oct", 10), ("november", 11), ("nov", 11), ("december", 12), ("dec", 12),
    ("январь", 1), ("января", 1), ("февраль", 2), ("февраля", 2), ("март", 3), ("марта", 3),
    ("апрель", 4), ("апреля", 4), ("май", 5), ("мая", 5), ("июнь", 6), ("июня", 6),
    ("июль", 7), ("июля", 7), ("август", 8), ("августа", 8), ("сентябрь", 9),
    ("сентября", 9), ("октябрь", 10), ("октября", 10), ("ноябрь", 11), ("ноября", 11),
    ("декабрь", 12), ("декабря", 12),
    ("січень", 1), ("січня", 1), ("лютий", 2), ("лютого", 2), ("березень", 3),
    ("березня", 3), ("квітень", 4), ("квітня", 4), ("травень", 5), ("травня", 5),
    ("червень", 6), ("червня", 6), ("липень", 7), ("липня", 7), ("серпень", 8),
    ("серпня", 8), ("вересень", 9), ("вересня", 9), ("жовтень", 10), ("жовтня", 10),
    ("листопад", 11), ("листопада", 11), ("грудень", 12), ("грудня", 12),
];

/// Parses heterogeneous timestamp strings into [`Timestamp`] values.
///
/// Built once per run; the pattern lists, month table and regexes are
/// read-only afterwards, so one instance can be shared by reference.
#[derive(Debug, Clone)]
pub struct TimeNormalizer {
    day_first: Vec<Pattern>,
    month_first: Vec<Pattern>,
    months: HashMap<&'static str, u32>,
    zone_suffix: Regex,
    clock: Regex,
    token: Regex,
    reference: FixedOffset,
    order_override: Option<DateOrder>,
}

impl Default for TimeNormalizer {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl TimeNormalizer {
    /// Creates a normalizer converting zoned timestamps to `reference`.
    pub fn new(reference: FixedOffset) -> Self {
        let ordered = |slashes: &[Pattern], other: &[Pattern]| -> Vec<Pattern> {
            PATTERNS
                .iter()
                .chain(slashes)
                .chain(other)
                .chain(DATE_PATTERNS)
                .copied()
                .collect()
        };

        Self {
            day_first: ordered(DAY_FIRST_SLASH, MONTH_FIRST_SLASH),
            month_first: ordered(MONTH_FIRST_SLASH, DAY_FIRST_SLASH),
            months: MONTH_NAMES.iter().copied().collect(),
            zone_suffix: Regex::new(
                r"(?i)^(?P<rest>.*?\d{1,2}:\d{2}(?::\d{2}(?:[.,]\d+)?)?(?:\s*[ap]\.?m\.?)?)\s*(?P<zone>(?:utc|gmt)\s*(?:[+-]\d{1,2}(?::?\d{2})?)?|z|[+-]\d{2}:?\d{2})$",
            )
            .expect("zone regex is valid"),
            clock: Regex::new(
                r"(?i)(?P<h>\d{1,2}):(?P<m>\d{2})(?::(?P<s>\d{2}))?(?:[.,]\d+)?(?:\s*(?P<ampm>[ap])\.?m\.?)?",
            )
            .expect("clock regex is valid"),
            token: Regex::new(r"\d+|\p{L}+").expect("token regex is valid"),
            reference,
            order_override: None,
        }
    }

    /// Builds a normalizer from an [`ExtractConfig`].
    pub fn from_config(config: &ExtractConfig) -> Result<Self> {
        let mut normalizer = Self::new(config.reference_offset()?);
        normalizer.order_override = config.date_order;
        Ok(normalizer)
    }

    /// Forces a date order regardless of the locale hint.
    #[must_use]
    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.order_override = Some(order);
        self
    }

    /// Returns the reference offset zoned timestamps are converted to.
    pub fn reference_offset(&self) -> FixedOffset {
        self.reference
    }

    /// Normalizes `raw` into a timestamp.
    ///
    /// The result depends only on `raw`, `locale_hint` and the normalizer's
    /// own configuration; the system clock and ambient locale are never read.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatvault::normalize::{Confidence, TimeNormalizer};
    ///
    /// let normalizer = TimeNormalizer::default();
    /// let result = normalizer.normalize("12.05.2023 14:30:02", None);
    /// assert_eq!(result.confidence, Confidence::Exact);
    /// assert_eq!(result.timestamp.unwrap().to_string(), "2023-05-12T14:30:02");
    ///
    /// let result = normalizer.normalize("31.02.2023 10:00:00", None);
    /// assert!(result.timestamp.is_none());
    /// ```
    pub fn normalize(&self, raw: &str, locale_hint: Option<&str>) -> NormalizedTime {
        let text = collapse_whitespace(raw);
        if text.is_empty() {
            return NormalizedTime::unparsed();
        }

        let order = DateOrder::resolve(self.order_override, locale_hint);

        let (body, offset) = match self.split_zone(&text) {
            Some((body, offset)) => (body, Some(offset)),
            None => (text.as_str(), None),
        };

        let resolved = self
            .match_patterns(body, order)
            .or_else(|| self.heuristic(body, order));

        let Some((naive, confidence)) = resolved else {
            return NormalizedTime::unparsed();
        };

        let timestamp = match offset {
            None => Some(Timestamp::Local(naive)),
            Some(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| Timestamp::Zoned(dt.with_timezone(&self.reference))),
        };

        match timestamp {
            Some(_) => NormalizedTime {
                timestamp,
                confidence,
            },
            None => NormalizedTime::unparsed(),
        }
    }

    /// Splits a trailing zone (`UTC+03:00`, `GMT-5`, `+0300`, `Z`) off the string.
    fn split_zone<'t>(&self, text: &'t str) -> Option<(&'t str, FixedOffset)> {
        let caps = self.zone_suffix.captures(text)?;
        let rest = caps.name("rest")?.as_str().trim_end();
        let offset = parse_zone(caps.name("zone")?.as_str())?;
        Some((rest, offset))
    }

    fn match_patterns(&self, text: &str, order: DateOrder) -> Option<(NaiveDateTime, Confidence)> {
        let patterns = match order {
            DateOrder::DayFirst => &self.day_first,
            DateOrder::MonthFirst => &self.month_first,
        };

        patterns.iter().find_map(|pattern| {
            let naive = match pattern.kind {
                PatternKind::DateTime => NaiveDateTime::parse_from_str(text, pattern.format).ok()?,
                PatternKind::Date => NaiveDate::parse_from_str(text, pattern.format)
                    .ok()?
                    .and_time(NaiveTime::MIN),
            };

            // chrono accepts 1-4 digit years for %Y; two-digit years belong to the heuristic
            if naive.year() < 1000 {
                return None;
            }

            let confidence = if pattern.swappable
                && naive.day() <= 12
                && naive.month() <= 12
                && naive.day() != naive.month()
            {
                Confidence::Ambiguous
            } else {
                Confidence::Exact
            };
            Some((naive, confidence))
        })
    }

    /// Positional fallback: pulls a clock and up to three date tokens out of
    /// the string and applies the day > 12 range rule.
    fn heuristic(&self, text: &str, order: DateOrder) -> Option<(NaiveDateTime, Confidence)> {
        let (time, remainder) = match self.clock.captures(text) {
            Some(caps) => {
                let whole = caps.get(0)?;
                let hour: u32 = caps.name("h")?.as_str().parse().ok()?;
                let minute: u32 = caps.name("m")?.as_str().parse().ok()?;
                let second: u32 = caps
                    .name("s")
                    .map_or(Some(0), |s| s.as_str().parse().ok())?;
                let hour = match caps.name("ampm").map(|m| m.as_str().to_ascii_lowercase()) {
                    Some(ref half) if half == "a" && hour == 12 => 0,
                    Some(ref half) if half == "p" && hour < 12 => hour + 12,
                    Some(_) if hour > 12 => return None,
                    _ => hour,
                };
                let time = NaiveTime::from_hms_opt(hour, minute, second)?;
                let remainder = format!("{} {}", &text[..whole.start()], &text[whole.end()..]);
                (time, remainder)
            }
            None => (NaiveTime::MIN, text.to_string()),
        };

        let mut numbers: Vec<(u32, usize)> = Vec::new();
        let mut month_word = None;
        for token in self.token.find_iter(&remainder).map(|m| m.as_str()) {
            if token.chars().all(|c| c.is_ascii_digit()) {
                numbers.push((token.parse().ok()?, token.len()));
            } else if month_word.is_none() {
                month_word = self.months.get(token.to_lowercase().as_str()).copied();
            }
        }

        let (year, month, day, confidence) = match month_word {
            Some(month) => {
                let (first, second) = (*numbers.first()?, *numbers.get(1)?);
                let (year, day) = if first.1 == 4 || first.0 > 31 {
                    (first, second)
                } else {
                    (second, first)
                };
                (year, month, day.0, Confidence::Heuristic)
            }
            None => {
                let [a, b, c] = [*numbers.first()?, *numbers.get(1)?, *numbers.get(2)?];
                if a.1 == 4 {
                    (a, b.0, c.0, Confidence::Heuristic)
                } else if a.0 > 12 && b.0 <= 12 {
                    (c, b.0, a.0, Confidence::Heuristic)
                } else if b.0 > 12 && a.0 <= 12 {
                    (c, a.0, b.0, Confidence::Heuristic)
                } else if a.0 > 12 && b.0 > 12 {
                    return None;
                } else {
                    let confidence = if a.0 == b.0 {
                        Confidence::Heuristic
                    } else {
                        Confidence::Ambiguous
                    };
                    match order {
                        DateOrder::DayFirst => (c, b.0, a.0, confidence),
                        DateOrder::MonthFirst => (c, a.0, b.0, confidence),
                    }
                }
            }
        };

        let year = match year {
            (value, len) if len <= 2 => 2000 + value as i32,
            (value, _) => value as i32,
        };

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some((date.and_time(time), confidence))
    }
}

/// Collapses whitespace runs (including NBSP and narrow NBSP) into single spaces.
fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a zone suffix into a fixed offset.
fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let lower = zone.trim().to_ascii_lowercase();
    let offset = lower
        .strip_prefix("utc")
        .or_else(|| lower.strip_prefix("gmt"))
        .unwrap_or(&lower)
        .trim();

    if offset.is_empty() || offset == "z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, digits) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
