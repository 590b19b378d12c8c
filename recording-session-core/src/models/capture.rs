use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One chunk of encoded audio delivered by a stream recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFragment {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl AudioFragment {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Everything captured by one completed browser stream session (host A).
///
/// Handed to the upload callback by value; the session keeps no copy.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamCapture {
    pub session_id: Uuid,
    pub fragments: Vec<AudioFragment>,
    pub elapsed_secs: u32,
    pub total_bytes: u64,
    /// SHA-256 hex digest over the fragment bytes in order.
    pub checksum: String,
    pub finished_at: String,
}

impl StreamCapture {
    pub fn summary(&self) -> CaptureSummary {
        CaptureSummary {
            session_id: self.session_id.to_string(),
            segment_count: self.fragments.len(),
            duration_secs: f64::from(self.elapsed_secs),
            total_bytes: self.total_bytes,
            checksum: Some(self.checksum.clone()),
            finished_at: self.finished_at.clone(),
        }
    }
}

/// Result descriptor reported by a host-managed recorder when it stops (host B).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedRecording {
    pub temp_file_path: String,
    /// Recorded length in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub file_size: u64,
}

/// Everything captured by one completed host-managed session (host B).
///
/// Holds more than one segment only when auto-continuation started new
/// segments at the host ceiling; segments are in recording order.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedCapture {
    pub session_id: Uuid,
    pub segments: Vec<ManagedRecording>,
    pub finished_at: String,
}

impl ManagedCapture {
    pub fn total_duration_secs(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_ms as f64).sum::<f64>() / 1000.0
    }

    pub fn total_bytes(&self) -> u64 {
        self.segments.iter().map(|s| s.file_size).sum()
    }

    pub fn summary(&self) -> CaptureSummary {
        CaptureSummary {
            session_id: self.session_id.to_string(),
            segment_count: self.segments.len(),
            duration_secs: self.total_duration_secs(),
            total_bytes: self.total_bytes(),
            checksum: None,
            finished_at: self.finished_at.clone(),
        }
    }
}

/// Serializable description of a delivered capture, for logs and backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub session_id: String,
    pub segment_count: usize,
    pub duration_secs: f64,
    pub total_bytes: u64,
    pub checksum: Option<String>,
    pub finished_at: String,
}
