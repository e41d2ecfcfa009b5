//! Muster Collector – accepts JSON capture records over HTTP and archives
//! each one as a timestamped file.
//!
//! This binary:
//! 1. Reads configuration from `muster.conf`
//! 2. Ensures the data directory exists
//! 3. Runs an axum HTTP server exposing `/collect` and `/health`

mod server;
mod storage;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── load config ──────────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| muster_common::config::Config::default_path().to_string());
    let config = muster_common::config::load_or_default(&PathBuf::from(&config_path))
        .context("Config load failed")?;

    info!(
        "Muster collector starting (listen={}, data_dir={})",
        config.listen_addr,
        config.data_dir.display()
    );

    std::fs::create_dir_all(&config.data_dir).context("Cannot create data directory")?;

    // ── ctrl-c ───────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
        info!("Shutdown signal received");
    })
    .context("Cannot set Ctrl-C handler")?;

    // ── serve until shutdown ─────────────────────────────────────────
    server::run(config.data_dir.clone(), &config.listen_addr, shutdown).await?;

    info!("Muster collector stopped");
    Ok(())
}
