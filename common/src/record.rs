//! The capture record assembled by the agent and archived by the collector.
//!
//! On the wire the record is an open JSON object; the collector accepts any
//! key set.  These types give the agent typed access to the known fields.

use serde::{Serialize, Serializer};

/// Timestamp format used both for the client-side `collected_at` field and
/// the server-side `timestamp` stamp (`2024-02-24_16-19-37`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Outcome of a single environment probe.
///
/// A failed probe serializes as the string `"Error: <reason>"` in place of
/// the value, so consumers of the stored JSON can tell "unknown" apart from
/// a real value without the record changing shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome<T> {
    Value(T),
    Failed(String),
}

impl<T> ProbeOutcome<T> {
    /// Fold a probe result into an outcome, keeping the full context chain
    /// of the error as the recorded reason.
    pub fn from_result(res: anyhow::Result<T>) -> Self {
        match res {
            Ok(v) => ProbeOutcome::Value(v),
            Err(e) => ProbeOutcome::Failed(format!("{e:#}")),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProbeOutcome::Failed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ProbeOutcome::Value(v) => Some(v),
            ProbeOutcome::Failed(_) => None,
        }
    }
}

impl<T: Serialize> Serialize for ProbeOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProbeOutcome::Value(v) => v.serialize(serializer),
            ProbeOutcome::Failed(reason) => {
                serializer.serialize_str(&format!("Error: {reason}"))
            }
        }
    }
}

/// The `system` block of a capture record.  Probed as one unit: if any of
/// its fields cannot be read the whole block is recorded as failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub platform: String,
    pub platform_release: String,
    pub architecture: String,
    pub hostname: String,
    pub processor: String,
    pub username: String,
}

/// One environment description, as submitted to the collector.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureRecord {
    pub public_ip: ProbeOutcome<String>,
    pub system: ProbeOutcome<SystemInfo>,
    pub timezone: ProbeOutcome<String>,
    pub is_mobile: bool,
    /// Client-side submission timestamp; the collector stamps its own
    /// `timestamp` key on receipt.
    pub collected_at: String,
}

impl std::fmt::Display for CaptureRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let host = self
            .system
            .value()
            .map(|s| s.hostname.as_str())
            .unwrap_or("?");
        let ip = self.public_ip.value().map(String::as_str).unwrap_or("?");
        write!(
            f,
            "CaptureRecord({host}, ip={ip}, mobile={}, at={})",
            self.is_mobile, self.collected_at
        )
    }
}

/// Substrings that flag a host as "mobile" when found in the platform or
/// architecture string (case-insensitive).  `arm` is known to also match
/// ARM desktops and servers; that behavior is kept as-is.
const MOBILE_MARKERS: [&str; 5] = ["android", "ios", "iphone", "ipad", "arm"];

/// Crude device-class guess from the platform and architecture strings.
pub fn is_mobile(platform: &str, architecture: &str) -> bool {
    let platform = platform.to_lowercase();
    let architecture = architecture.to_lowercase();
    MOBILE_MARKERS
        .iter()
        .any(|m| platform.contains(m) || architecture.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_system() -> SystemInfo {
        SystemInfo {
            platform: "Linux".to_string(),
            platform_release: "6.8.0".to_string(),
            architecture: "x86_64".to_string(),
            hostname: "workstation-3".to_string(),
            processor: "AMD Ryzen 7 5800X".to_string(),
            username: "carol".to_string(),
        }
    }

    #[test]
    fn test_failed_probe_serializes_as_error_string() {
        let outcome: ProbeOutcome<String> =
            ProbeOutcome::Failed("connection refused".to_string());
        let v = serde_json::to_value(&outcome).unwrap();
        let s = v.as_str().unwrap();
        assert!(s.starts_with("Error:"));
        assert!(s.contains("connection refused"));
    }

    #[test]
    fn test_value_probe_serializes_transparently() {
        let outcome = ProbeOutcome::Value(sample_system());
        let v = serde_json::to_value(&outcome).unwrap();
        assert_eq!(v["hostname"], "workstation-3");
        assert_eq!(v["username"], "carol");
    }

    #[test]
    fn test_record_keeps_other_fields_when_ip_probe_fails() {
        let record = CaptureRecord {
            public_ip: ProbeOutcome::Failed("GET ip-echo service: timed out".to_string()),
            system: ProbeOutcome::Value(sample_system()),
            timezone: ProbeOutcome::Value("Europe/Madrid".to_string()),
            is_mobile: false,
            collected_at: "2024-02-24_16-19-37".to_string(),
        };
        let v = serde_json::to_value(&record).unwrap();
        assert!(v["public_ip"].as_str().unwrap().starts_with("Error:"));
        assert_eq!(v["system"]["platform"], "Linux");
        assert_eq!(v["timezone"], "Europe/Madrid");
        assert_eq!(v["collected_at"], "2024-02-24_16-19-37");
    }

    #[test]
    fn test_mobile_markers_match_platform() {
        assert!(is_mobile("Android", "aarch64"));
        assert!(is_mobile("iOS", "arm64"));
        assert!(!is_mobile("Linux", "x86_64"));
        assert!(!is_mobile("Windows", "amd64"));
    }

    // An ARM workstation trips the `arm` marker.  Known false positive,
    // asserted literally.
    #[test]
    fn test_arm_server_flagged_as_mobile() {
        assert!(is_mobile("Linux", "armv7l"));
        assert!(is_mobile("Linux", "ARM64"));
    }

    #[test]
    fn test_record_display_summary() {
        let record = CaptureRecord {
            public_ip: ProbeOutcome::Value("203.0.113.7".to_string()),
            system: ProbeOutcome::Value(sample_system()),
            timezone: ProbeOutcome::Failed("tz lookup failed".to_string()),
            is_mobile: false,
            collected_at: "2024-02-24_16-19-37".to_string(),
        };
        let s = format!("{record}");
        assert!(s.contains("workstation-3"));
        assert!(s.contains("203.0.113.7"));
    }
}
