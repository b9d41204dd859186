//! Command-line interface definition using clap.
//!
//! [`Args`] maps one-to-one onto the library's configuration types:
//! [`Args::extract_config`] builds the [`ExtractConfig`] and
//! [`Args::chat_attributes`] the operator [`ChatAttributes`].

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{ChatAttributes, ExtractConfig, parse_offset};
use crate::core::Dialect;
use crate::error::{ChatvaultError, Result};
use crate::normalize::DateOrder;

/// Extract chats and messages from Telegram HTML exports into JSON
/// snapshots and SQL stores.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatvault")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatvault ~/Downloads/ChatExport_2023-05-12
    chatvault messages.html messages2.html --chat-id 1001 --private
    chatvault export/ --locale en-US --utc-offset +03:00 --sqlite data/chats.sqlite
    chatvault archive.html --no-json --sql-dialect postgres --sql-out import.sql")]
pub struct Args {
    /// Export pages (in order) or one export directory
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Directory for <slug>.json snapshots and the chats.json index
    #[arg(short, long, value_name = "DIR", default_value = "data/json")]
    pub output_dir: PathBuf,

    /// Skip writing JSON snapshots
    #[arg(long)]
    pub no_json: bool,

    /// Locale hint for timestamp parsing (e.g. en-US, uk)
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Offset zoned timestamps are converted to (e.g. +03:00)
    #[arg(long, value_name = "±HH:MM", allow_hyphen_values = true)]
    pub utc_offset: Option<String>,

    /// Read ambiguous numeric dates as DD/MM
    #[arg(long, conflicts_with = "month_first")]
    pub day_first: bool,

    /// Read ambiguous numeric dates as MM/DD
    #[arg(long)]
    pub month_first: bool,

    /// Keep at most N words in chat slugs
    #[arg(long, value_name = "N")]
    pub slug_max_words: Option<usize>,

    /// External chat id to record
    #[arg(long, value_name = "ID", allow_hyphen_values = true)]
    pub chat_id: Option<i64>,

    /// Mark the chat as no longer active
    #[arg(long)]
    pub inactive: bool,

    /// Mark the operator as not a member
    #[arg(long)]
    pub not_member: bool,

    /// Mark the chat as private
    #[arg(long)]
    pub private: bool,

    /// Import into this SQLite database
    #[arg(long, value_name = "PATH")]
    pub sqlite: Option<PathBuf>,

    /// Render an SQL import script in this dialect
    #[arg(long, value_name = "DIALECT", requires = "sql_out")]
    pub sql_dialect: Option<Dialect>,

    /// Where to write the SQL script
    #[arg(long, value_name = "PATH", requires = "sql_dialect")]
    pub sql_out: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the extraction configuration from the flags.
    pub fn extract_config(&self) -> Result<ExtractConfig> {
        let mut config = ExtractConfig::new();
        if let Some(locale) = &self.locale {
            config = config.with_locale_hint(locale.clone());
        }
        if let Some(offset) = &self.utc_offset {
            config = config.with_reference_offset(parse_offset(offset)?);
        }
        if self.day_first {
            config = config.with_date_order(DateOrder::DayFirst);
        } else if self.month_first {
            config = config.with_date_order(DateOrder::MonthFirst);
        }
        if let Some(words) = self.slug_max_words {
            if words == 0 {
                return Err(ChatvaultError::invalid_config(
                    "slug_max_words",
                    "must be at least 1",
                ));
            }
            config = config.with_slug_max_words(words);
        }
        Ok(config)
    }

    /// Builds the operator chat attributes from the flags.
    pub fn chat_attributes(&self) -> ChatAttributes {
        let mut attrs = ChatAttributes::new()
            .with_active(!self.inactive)
            .with_member(!self.not_member)
            .with_public(!self.private);
        attrs.id = self.chat_id;
        attrs
    }

    /// Default tracing filter for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
