//! Standalone preset service binary.
//!
//! Serves the preset REST API over plain HTTP, backed by SQLite by
//! default or by an in-memory store for throwaway sessions.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use log::info;

use wavedeck_core::service::{PresetService, SharedStore};
use wavedeck_core::store::{MemoryStore, PresetStore, SqliteStore};

#[derive(Parser)]
#[command(name = "wavedeck-service")]
#[command(author, version, about = "Preset storage service for WaveDeck", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,

    /// Path to the SQLite database file
    #[arg(long, default_value = "wavedeck.db")]
    db: PathBuf,

    /// Keep presets in memory instead of SQLite (lost on exit)
    #[arg(long)]
    memory: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let store: Box<dyn PresetStore + Send> = if cli.memory {
        info!("Using in-memory preset store");
        Box::new(MemoryStore::new())
    } else {
        info!("Opening preset database at {}", cli.db.display());
        Box::new(SqliteStore::open(&cli.db)?)
    };
    let store: SharedStore = Arc::new(Mutex::new(store));

    let service = PresetService::bind(&cli.addr, store)?;
    service.serve()?;
    Ok(())
}
