//! Inkblock terminal host
//!
//! Reads stdin line by line. Lines starting with `:` drive the title/save
//! toolbar; every other line is typed into the editor followed by Enter.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use inkblock::core::config::{AppConfig, LogLevel};
use inkblock::core::persistence::{FileStore, PersistenceAdapter, StoredContent};
use inkblock::{Block, EditorApp, Key, KeyEvent};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

/// One line per block: type, then text with styled runs bracketed
fn render_block(block: &Block) -> String {
    let mut out = format!("[{}] ", block.block_type());
    let mut chars = block.text().chars();
    for run in block.style_runs() {
        let text: String = chars.by_ref().take(run.length).collect();
        if run.styles.is_empty() {
            out.push_str(&text);
        } else {
            let names: Vec<&str> = run.styles.iter().map(|s| s.as_str()).collect();
            out.push_str(&format!("{{{}:{}}}", names.join("+"), text));
        }
    }
    out
}

fn print_document<P: PersistenceAdapter>(app: &EditorApp<P>, out: &mut impl Write) -> Result<()> {
    let title = app.title_placeholder().unwrap_or(app.title());
    writeln!(out, "== {}", title)?;
    match app.placeholder() {
        Some(placeholder) => writeln!(out, "   ({})", placeholder)?,
        None => {
            for block in app.state().document().blocks_in_order() {
                writeln!(out, "   {}", render_block(block))?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Using default config: {:#}", e);
        AppConfig::default()
    });

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(level_filter(config.log_level))
        .init();

    tracing::info!("Starting Inkblock...");

    let store = FileStore::new(config.data_dir());
    tracing::info!("Content store: {}", store.dir().display());
    let persistence = StoredContent::with_key(store, config.storage.storage_key.clone());
    let mut app = EditorApp::new(persistence, config.editor.clone());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print_document(&app, &mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if let Some(title) = line.strip_prefix(":title ") {
            app.on_title_change(title);
        } else if line == ":save" {
            match app.on_save_content() {
                Ok(()) => writeln!(stdout, "saved")?,
                Err(e) => tracing::error!("Failed to save content: {}", e),
            }
            continue;
        } else if line == ":quit" {
            break;
        } else if line != ":show" {
            app.type_text(&line);
            app.on_key(KeyEvent::new(Key::Enter));
        }
        print_document(&app, &mut stdout)?;
    }

    Ok(())
}
