//! Environment probes.
//!
//! Each probe is independently best-effort: the caller records a failure
//! and moves on to the next one.  Probes run sequentially on the calling
//! thread; a slow network call holds up the rest of the sequence until the
//! client timeout fires.

use anyhow::{Context, Result};

use muster_common::record::SystemInfo;

/// Ask an IP-echo service for this host's public address.
///
/// Expects an ipify-style response: `{"ip": "203.0.113.7"}`.
pub fn public_ip(client: &reqwest::blocking::Client, echo_url: &str) -> Result<String> {
    let resp = client.get(echo_url).send().context("GET ip-echo service")?;
    if !resp.status().is_success() {
        anyhow::bail!("ip-echo service returned {}", resp.status());
    }
    let body: serde_json::Value = resp.json().context("Parse ip-echo response")?;
    body.get("ip")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("ip-echo response has no \"ip\" field"))
}

/// Read the local system block.  Fails as one unit: if the OS name or the
/// hostname cannot be determined, the whole block is reported failed.
pub fn system_info() -> Result<SystemInfo> {
    let platform = sysinfo::System::name().context("OS name unavailable")?;
    let platform_release =
        sysinfo::System::os_version().unwrap_or_else(|| "unknown".to_string());
    let hostname = whoami::fallible::hostname().context("Hostname unavailable")?;

    let mut sys = sysinfo::System::new();
    sys.refresh_cpu_all();
    let processor = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(SystemInfo {
        platform,
        platform_release,
        architecture: whoami::arch().to_string(),
        hostname,
        processor,
        username: whoami::username(),
    })
}

/// IANA timezone name of the host (e.g. `Europe/Madrid`).
pub fn timezone() -> Result<String> {
    iana_time_zone::get_timezone().context("Cannot determine local timezone")
}

// ─── tests ───────────────────────────────────────────────────────────────
