// Batch run tracing
// Append-only JSONL trace of each recording's ingest, peak, and segmentation stages

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during trace operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Stage of the batch a trace entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStage {
    Batch,
    Ingest,
    Peaks,
    Segmentation,
}

/// A single line of the trace file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// RFC 3339 creation time
    pub timestamp: String,

    /// Identifies the batch run the entry belongs to
    pub run_id: Uuid,

    pub stage: TraceStage,

    /// Recording being processed, absent for batch-level entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording: Option<String>,

    /// Fraction of the batch completed [0.0, 1.0]
    pub progress: f32,

    pub message: String,

    /// Structured payload (peak indices, summary counts, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Appends trace entries to a JSONL file
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    pub fn new(file_path: PathBuf) -> Self {
        TraceWriter { file_path }
    }

    /// Append one entry, creating the file if needed
    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        let json_line = entry.to_json_line()?;
        file.write_all(json_line.as_bytes())?;
        file.flush()?;

        Ok(())
    }
}

/// Builds entries for one stage of one run
pub struct TraceBuilder {
    run_id: Uuid,
    stage: TraceStage,
    recording: Option<String>,
}

impl TraceBuilder {
    pub fn new(run_id: Uuid, stage: TraceStage) -> Self {
        TraceBuilder {
            run_id,
            stage,
            recording: None,
        }
    }

    /// Attach the recording name
    pub fn recording(mut self, name: impl Into<String>) -> Self {
        self.recording = Some(name.into());
        self
    }

    pub fn progress(self, progress: f32, message: impl Into<String>) -> TraceEntry {
        self.build(progress, message.into(), None)
    }

    pub fn with_data(
        self,
        progress: f32,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> TraceEntry {
        self.build(progress, message.into(), Some(data))
    }

    fn build(self, progress: f32, message: String, data: Option<serde_json::Value>) -> TraceEntry {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            run_id: self.run_id,
            stage: self.stage,
            recording: self.recording,
            progress: progress.clamp(0.0, 1.0),
            message,
            data,
        }
    }
}

/// Read trace entries from a JSONL file
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let entry: TraceEntry = serde_json::from_str(line)?;
        entries.push(entry);
    }

    Ok(entries)
}
