//! Extraction orchestration and output writers.
//!
//! This module contains:
//! - [`pipeline`] - [`Pipeline`], sequencing load → chat → messages
//! - [`output`] - JSON snapshots, SQL scripts and the SQLite writer
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "json-output")]
//! # fn main() -> chatvault::Result<()> {
//! use chatvault::config::{ChatAttributes, ExtractConfig};
//! use chatvault::core::{Pipeline, write_json};
//!
//! let html = std::fs::read("export/messages.html")?;
//! let extraction = Pipeline::new(ExtractConfig::default())?
//!     .run(&html, &ChatAttributes::default())?;
//! write_json(&extraction, "data/json")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "json-output"))]
//! # fn main() {}
//! ```

pub mod output;
pub mod pipeline;

pub use pipeline::{Extraction, Pipeline};

pub use output::Dialect;
#[cfg(feature = "sqlite")]
pub use output::{SqliteWriter, WriteStats};
#[cfg(feature = "json-output")]
pub use output::{read_chat_index, to_json, update_chat_index, write_json};
