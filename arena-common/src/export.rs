//! Result export
//!
//! The session hands the serialized result to an [`ExportSink`] exactly once,
//! at the transition into the results phase.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::result::SessionResult;
use crate::time::unix_millis;

/// Suggested filename: `image-arena-results-<unix-millis>.json`
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("image-arena-results-{}.json", unix_millis(at))
}

/// Serialized result ready for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub fn from_result(result: &SessionResult, at: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            filename: export_filename(at),
            bytes: serde_json::to_vec_pretty(result)?,
        })
    }
}

/// Destination for exported results
pub trait ExportSink: Send + Sync {
    fn deliver(&self, file: ExportedFile) -> Result<()>;
}

/// In-memory sink keeping the latest export for download
#[derive(Debug, Clone, Default)]
pub struct DownloadSlot {
    latest: Arc<Mutex<Option<ExportedFile>>>,
}

impl DownloadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<ExportedFile> {
        self.latest.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn clear(&self) {
        if let Ok(mut slot) = self.latest.lock() {
            *slot = None;
        }
    }
}

impl ExportSink for DownloadSlot {
    fn deliver(&self, file: ExportedFile) -> Result<()> {
        let mut slot = self
            .latest
            .lock()
            .map_err(|_| Error::Internal("download slot lock poisoned".to_string()))?;
        *slot = Some(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_filename_pattern() {
        let at = Utc.timestamp_millis_opt(1_730_000_000_123).unwrap();
        assert_eq!(export_filename(at), "image-arena-results-1730000000123.json");
    }

    #[test]
    fn test_from_result_is_json() {
        let result = SessionResult::from_votes(Utc::now(), "a", "b", 0, vec![]);
        let file = ExportedFile::from_result(&result, Utc::now()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&file.bytes).unwrap();
        assert!(parsed["overallWinner"].is_null());
        assert!(file.filename.starts_with("image-arena-results-"));
        assert!(file.filename.ends_with(".json"));
    }

    #[test]
    fn test_download_slot_keeps_latest() {
        let slot = DownloadSlot::new();
        assert!(slot.latest().is_none());

        let shared = slot.clone();
        shared
            .deliver(ExportedFile {
                filename: "one.json".into(),
                bytes: b"{}".to_vec(),
            })
            .unwrap();
        assert_eq!(slot.latest().unwrap().filename, "one.json");

        slot.clear();
        assert!(shared.latest().is_none());
    }
}
