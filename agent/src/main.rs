//! Muster Agent – probes the local environment, assembles a capture record
//! and submits it to the collector.
//!
//! One-shot: collect, send, exit.  Probes are straight-line blocking calls
//! with no parallelism; the outbound HTTP client carries the configured
//! timeout.

mod probes;
mod report;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

fn main() -> Result<()> {
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

    info!("Muster agent starting (collect_url={})", config.collect_url);

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("Cannot create HTTP client")?;

    // ── collect ──────────────────────────────────────────────────────
    let record = report::collect(&client, &config.ip_echo_url);
    info!("{record}");
    if let Ok(pretty) = serde_json::to_string_pretty(&record) {
        debug!("Record:\n{pretty}");
    }

    // ── send ─────────────────────────────────────────────────────────
    match report::send(&client, &config.collect_url, &record) {
        Ok(()) => info!("Record sent successfully"),
        Err(e) => {
            error!("Failed to send record: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}
