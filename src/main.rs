//! # chatvault CLI
//!
//! Command-line front end: resolve pages, extract, then write. Extraction
//! finishes completely before any writer runs, so a failed run leaves the
//! output directory and database untouched.

use std::fs;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatvault::ChatvaultError;
use chatvault::cli::Args;
use chatvault::core::{Extraction, Pipeline, update_chat_index, write_json};
use chatvault::input::{read_pages, resolve_inputs};

#[cfg(feature = "sqlite")]
use chatvault::core::SqliteWriter;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "CHATVAULT_LOG";

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(&args);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), ChatvaultError> {
    let total_start = Instant::now();

    let config = args.extract_config()?;
    let attrs = args.chat_attributes();
    let pages = resolve_inputs(&args.inputs)?;

    println!("📦 chatvault v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Pages:   {}", pages.len());
    if let Some(locale) = &config.locale_hint {
        println!("🌐 Locale:  {}", locale);
    }
    println!("📅 Dates:   {}", config.effective_date_order());
    println!();

    // Step 1: Extract everything before touching any output
    println!("⏳ Extracting...");
    let extract_start = Instant::now();
    let html = read_pages(&pages)?;
    let pipeline = Pipeline::new(config)?;
    // The external id can only belong to one chat: the first in the export.
    let mut first = true;
    let extractions = pipeline.run_all(&html, |_| {
        let mut chat_attrs = attrs;
        if !std::mem::take(&mut first) {
            chat_attrs.id = None;
        }
        chat_attrs
    })?;
    let message_count: usize = extractions.iter().map(|e| e.messages.len()).sum();
    println!(
        "   Found {} chat(s), {} messages ({:.2}s)",
        extractions.len(),
        message_count,
        extract_start.elapsed().as_secs_f64()
    );

    for extraction in &extractions {
        print_chat(extraction);
    }

    // Step 2: Writers
    if !args.no_json {
        println!("💾 Writing JSON...");
        for extraction in &extractions {
            let path = write_json(extraction, &args.output_dir)?;
            println!("   {}", path.display());
        }
        let chats: Vec<_> = extractions.iter().map(|e| e.chat.clone()).collect();
        let index = update_chat_index(&args.output_dir, &chats)?;
        println!("   {}", index.display());
    }

    if let (Some(dialect), Some(out)) = (args.sql_dialect, &args.sql_out) {
        println!("💾 Writing {} script...", dialect);
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(out, dialect.render(&extractions))?;
        println!("   {}", out.display());
    }

    if let Some(db) = &args.sqlite {
        write_sqlite(db, &extractions)?;
    }

    println!();
    println!("✅ Done in {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}

fn print_chat(extraction: &Extraction) {
    let degraded = extraction.degraded_timestamps();
    println!(
        "   💬 {} [{}]: {} messages",
        extraction.chat.title,
        extraction.chat.slug,
        extraction.messages.len()
    );
    if degraded > 0 {
        println!("      ⚠️  {} timestamps could not be parsed (kept raw)", degraded);
    }
}

#[cfg(feature = "sqlite")]
fn write_sqlite(db: &std::path::Path, extractions: &[Extraction]) -> Result<(), ChatvaultError> {
    println!("🗄️  Importing into {}...", db.display());
    let stats = SqliteWriter::open(db)?.write_all(extractions)?;
    println!(
        "   {} chat(s), {} new messages, {} already present",
        stats.chats, stats.inserted, stats.skipped
    );
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn write_sqlite(db: &std::path::Path, _extractions: &[Extraction]) -> Result<(), ChatvaultError> {
    Err(ChatvaultError::invalid_config(
        "sqlite",
        format!("{} requested but built without the sqlite feature", db.display()),
    ))
}
