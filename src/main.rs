mod auth;
mod config;
mod db;
mod export;
mod ledger;
mod models;
mod run;
mod ui;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let interactive = args.len() < 2;

    let config = config::Config::load_or_create(config::Config::default_root()?)?;
    if interactive {
        // The alternate screen owns stdout/stderr while the TUI runs.
        init_file_logger(config.log_level(), &config.log_path())?;
    } else {
        init_logger(config.log_level());
    }
    tracing::debug!(root = %config.root().display(), "Loaded config");

    let db = db::Database::open(&config.db_path())?;
    let mut auth = auth::AuthContext::new(config.session_path());
    auth.load(&db)?;

    if interactive {
        run::as_tui(&db, &config, auth)
    } else {
        run::as_cli(&args, &db, &config, &mut auth)
    }
}

fn env_filter(level: &str) -> EnvFilter {
    match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    }
}

pub fn init_logger(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .init();
}

fn init_file_logger(level: &str, path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
