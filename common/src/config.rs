//! Configuration parsing – reads a `KEY=VALUE` file (`muster.conf`).
//!
//! Both binaries load the same file; each ignores keys it does not need.
//! Every key has a built-in default, so running without a config file is
//! supported.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// Application configuration, shared between the collector and the agent.
#[derive(Debug, Clone)]
pub struct Config {
    // ── collector ────────────────────────────────────────────────────
    /// Address the collector HTTP server listens on.
    pub listen_addr: String,
    /// Directory where capture files are written.
    pub data_dir: PathBuf,

    // ── agent ────────────────────────────────────────────────────────
    /// URL the agent submits its record to.
    pub collect_url: String,
    /// IP-echo service queried for the public address.
    pub ip_echo_url: String,
    /// Timeout applied to the agent's outbound HTTP client (seconds).
    pub http_timeout_secs: u64,
}

impl Config {
    /// Default config path.
    pub fn default_path() -> &'static str {
        "/etc/muster/muster.conf"
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            data_dir: PathBuf::from("./collected_data"),
            collect_url: "http://localhost:8080/collect".to_string(),
            ip_echo_url: "https://api.ipify.org?format=json".to_string(),
            http_timeout_secs: 30,
        }
    }
}

/// Parse a `KEY=VALUE` configuration file.
///
/// Lines starting with `#` are comments.  Values may be optionally
/// double-quoted.  Unknown keys are silently ignored.
pub fn load(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;

    let map = parse_conf(&text);
    info!("Loaded config from {}", path.display());

    let defaults = Config::default();
    let get = |key: &str| -> Option<String> { map.get(key).cloned() };

    Ok(Config {
        listen_addr: get("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
        data_dir: get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir),
        collect_url: get("COLLECT_URL").unwrap_or(defaults.collect_url),
        ip_echo_url: get("IP_ECHO_URL").unwrap_or(defaults.ip_echo_url),
        http_timeout_secs: get("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.http_timeout_secs),
    })
}

/// Load `path` if it exists, otherwise fall back to the built-in defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load(path)
    } else {
        info!("No config at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

/// Parse `KEY=VALUE` lines into a map, stripping optional double-quotes.
fn parse_conf(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            let key = key.trim();
            let val = val.trim().trim_matches('"');
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

// ─── tests ───────────────────────────────────────────────────────────────
