//! Record assembly and submission.

use anyhow::{Context, Result};
use chrono::Local;
use tracing::warn;

use muster_common::record::{is_mobile, CaptureRecord, ProbeOutcome, TIMESTAMP_FORMAT};

use crate::probes;

/// Run every probe and aggregate the outcomes into one record.
///
/// A failed probe is recorded in place of its value and the remaining
/// probes still run.
pub fn collect(client: &reqwest::blocking::Client, ip_echo_url: &str) -> CaptureRecord {
    let public_ip = outcome("public_ip", probes::public_ip(client, ip_echo_url));
    let system = outcome("system", probes::system_info());
    let timezone = outcome("timezone", probes::timezone());

    let mobile = system
        .value()
        .map(|info| is_mobile(&info.platform, &info.architecture))
        .unwrap_or(false);

    CaptureRecord {
        public_ip,
        system,
        timezone,
        is_mobile: mobile,
        collected_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    }
}

fn outcome<T>(probe: &str, res: Result<T>) -> ProbeOutcome<T> {
    if let Err(e) = &res {
        warn!("Probe {probe} failed: {e:#}");
    }
    ProbeOutcome::from_result(res)
}

/// POST the record to the collector. Success is exactly HTTP 200; anything
/// else, including a transport error, is a failure.  No retry.
pub fn send(
    client: &reqwest::blocking::Client,
    collect_url: &str,
    record: &CaptureRecord,
) -> Result<()> {
    let resp = client
        .post(collect_url)
        .json(record)
        .send()
        .context("POST record to collector")?;

    if resp.status() != reqwest::StatusCode::OK {
        anyhow::bail!("collector returned {}", resp.status());
    }
    Ok(())
}

// ─── tests ───────────────────────────────────────────────────────────────
