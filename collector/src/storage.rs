//! Capture-file persistence: stamp a received record and write it out.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value};

use muster_common::record::TIMESTAMP_FORMAT;

/// Failure while archiving a record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid record: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid record: not a JSON object")]
    NotAnObject,
    #[error("cannot write capture file: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse `body` as a JSON object, stamp it with `received`, and write it to
/// `data_dir` as `data_<timestamp>.json`.  Returns the path written.
///
/// Any key set is accepted; an existing `timestamp` key is overwritten.
/// Records received within the same second map to the same path, so the
/// later one wins.  Accepted limitation.
pub fn store(
    data_dir: &Path,
    body: &[u8],
    received: DateTime<Local>,
) -> Result<PathBuf, StoreError> {
    let value: Value = serde_json::from_slice(body)?;
    let mut record = match value {
        Value::Object(map) => map,
        _ => return Err(StoreError::NotAnObject),
    };

    let timestamp = received.format(TIMESTAMP_FORMAT).to_string();
    record.insert("timestamp".to_string(), Value::String(timestamp.clone()));

    std::fs::create_dir_all(data_dir)?;
    let path = data_dir.join(format!("data_{timestamp}.json"));
    std::fs::write(&path, to_pretty_json(&record)?)?;
    Ok(path)
}

/// Pretty-print with 4-space indentation (serde_json defaults to 2).
fn to_pretty_json(record: &Map<String, Value>) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;
    Ok(buf)
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("muster_storage_test").join(name);
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn receipt_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 2, 24, 16, 19, 37).unwrap()
    }

    #[test]
    fn test_store_stamps_and_persists() {
        let dir = temp_dir("stamp");
        let body = br#"{"public_ip": "203.0.113.7", "timezone": "Europe/Madrid"}"#;

        let path = store(&dir, body, receipt_time()).unwrap();
        assert_eq!(path, dir.join("data_2024-02-24_16-19-37.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        let stored: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(stored["public_ip"], "203.0.113.7");
        assert_eq!(stored["timezone"], "Europe/Madrid");
        assert_eq!(stored["timestamp"], "2024-02-24_16-19-37");

        // 4-space indentation
        assert!(text.contains("\n    \""));
    }

    #[test]
    fn test_store_overwrites_client_timestamp() {
        let dir = temp_dir("overwrite_ts");
        let body = br#"{"timestamp": "1999-01-01_00-00-00"}"#;

        let path = store(&dir, body, receipt_time()).unwrap();
        let stored: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["timestamp"], "2024-02-24_16-19-37");
    }

    #[test]
    fn test_store_rejects_garbage_without_writing() {
        let dir = temp_dir("garbage");
        let err = store(&dir, b"not json at all", receipt_time()).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_store_rejects_invalid_utf8_without_writing() {
        let dir = temp_dir("invalid_utf8");
        let err = store(&dir, &[0xff, 0xfe, 0xfd], receipt_time()).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_store_rejects_non_object_json() {
        let dir = temp_dir("non_object");
        let err = store(&dir, br#"[1, 2, 3]"#, receipt_time()).unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject));
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    // Two records in the same second share a path; last write wins.
    #[test]
    fn test_same_second_last_write_wins() {
        let dir = temp_dir("same_second");
        let first = store(&dir, br#"{"seq": 1}"#, receipt_time()).unwrap();
        let second = store(&dir, br#"{"seq": 2}"#, receipt_time()).unwrap();
        assert_eq!(first, second);

        let stored: Value =
            serde_json::from_str(&std::fs::read_to_string(&second).unwrap()).unwrap();
        assert_eq!(stored["seq"], 2);
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
    }

    #[test]
    fn test_store_creates_missing_directory() {
        let dir = temp_dir("missing").join("nested").join("logs");
        let path = store(&dir, b"{}", receipt_time()).unwrap();
        assert!(path.exists());
    }
}
