// Batch segmentation
// Runs every raw recording in a directory through the segmenter

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::output::{prepare_output_dir, CsvDirectorySink, ExampleSink, SinkError};
use crate::pipeline::trace::{TraceBuilder, TraceEntry, TraceError, TraceStage, TraceWriter};
use crate::segmenter::{ConfigError, SegmentationSummary, Segmenter, SegmenterConfig};
use crate::sensor::load_recording;

/// Fatal batch errors; a single bad recording is not one of them
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Raw data directory {0:?} does not exist")]
    MissingRawDir(PathBuf),

    #[error("Raw data directory {0:?} contains no recordings")]
    EmptyRawDir(PathBuf),

    #[error("Output directory {output:?} overlaps raw data directory {raw:?}")]
    OutputOverlapsRaw { raw: PathBuf, output: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write example: {0}")]
    Sink(#[from] SinkError),

    #[error("Failed to write trace: {0}")]
    Trace(#[from] TraceError),
}

/// A recording left out of the batch and why
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRecording {
    pub name: String,
    pub reason: String,
}

/// Outcome of a whole batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub summaries: Vec<SegmentationSummary>,
    pub skipped: Vec<SkippedRecording>,
}

impl BatchReport {
    pub fn onset_emitted(&self) -> u64 {
        self.summaries.iter().map(|s| s.onset_emitted).sum()
    }

    pub fn background_emitted(&self) -> u64 {
        self.summaries.iter().map(|s| s.background_emitted).sum()
    }

    pub fn background_seen(&self) -> u64 {
        self.summaries.iter().map(|s| s.background_seen).sum()
    }
}

/// Sorted list of recording files in `raw_dir`
/// Fails before anything is written when the directory is missing or empty.
pub fn list_recordings(raw_dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !raw_dir.is_dir() {
        return Err(BatchError::MissingRawDir(raw_dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(raw_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    if files.is_empty() {
        return Err(BatchError::EmptyRawDir(raw_dir.to_path_buf()));
    }

    files.sort();
    Ok(files)
}

/// Absolute, symlink-free form of `path`, which need not exist yet
fn resolve_path(path: &Path) -> Result<PathBuf, std::io::Error> {
    let absolute = std::env::current_dir()?.join(path);
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(base) => return Ok(missing.iter().rev().fold(base, |acc, name| acc.join(name))),
            Err(e) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_os_string());
                    existing = parent;
                }
                _ => return Err(e),
            },
        }
    }
}

/// The output tree is deleted on every run, so it must neither be nor contain
/// the raw data directory
pub fn check_disjoint(raw_dir: &Path, output_dir: &Path) -> Result<(), BatchError> {
    let raw = resolve_path(raw_dir)?;
    let output = resolve_path(output_dir)?;

    if raw.starts_with(&output) || output.starts_with(&raw) {
        return Err(BatchError::OutputOverlapsRaw { raw, output });
    }
    Ok(())
}

/// Drives one batch: a single segmenter and random source shared by every
/// recording, processed strictly one after another
pub struct BatchRunner {
    segmenter: Segmenter,
    rng: StdRng,
    trace: Option<TraceWriter>,
    run_id: Uuid,
}

impl BatchRunner {
    pub fn new(config: SegmenterConfig) -> Result<Self, BatchError> {
        let rng = config.rng();
        let segmenter = Segmenter::new(config)?;

        Ok(BatchRunner {
            segmenter,
            rng,
            trace: None,
            run_id: Uuid::new_v4(),
        })
    }

    /// Record stage progress to a JSONL trace file
    pub fn with_trace(mut self, writer: TraceWriter) -> Self {
        self.trace = Some(writer);
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Segment every recording in `raw_dir` into a fresh `output_dir`
    pub fn run(&mut self, raw_dir: &Path, output_dir: &Path) -> Result<BatchReport, BatchError> {
        let recordings = list_recordings(raw_dir)?;
        check_disjoint(raw_dir, output_dir)?;
        prepare_output_dir(output_dir)?;

        log::info!(
            "Sampling rate for non-gesture windows: {}",
            self.segmenter.config().background_rate
        );

        let mut sink = CsvDirectorySink::new(output_dir.to_path_buf());
        let report = self.run_with_sink(&recordings, &mut sink)?;

        log::info!("Wrote {} examples to {}", sink.written(), output_dir.display());
        Ok(report)
    }

    /// Segment the given recordings into any sink
    ///
    /// A recording that fails to load is logged and skipped; sink and trace
    /// failures abort the batch.
    pub fn run_with_sink<S: ExampleSink + ?Sized>(
        &mut self,
        recordings: &[PathBuf],
        sink: &mut S,
    ) -> Result<BatchReport, BatchError> {
        let total = recordings.len();
        let mut report = BatchReport {
            run_id: self.run_id,
            summaries: Vec::new(),
            skipped: Vec::new(),
        };

        self.trace(
            TraceBuilder::new(self.run_id, TraceStage::Batch).with_data(
                0.0,
                format!("Segmenting {} recordings", total),
                serde_json::to_value(self.segmenter.config())
                    .map_err(TraceError::from)?,
            ),
        )?;

        for (idx, path) in recordings.iter().enumerate() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let progress = (idx + 1) as f32 / total as f32;

            log::info!("processing {}...", name);

            let recording = match load_recording(path) {
                Ok(recording) => recording,
                Err(e) => {
                    log::warn!("Skipping {}: {}", name, e);
                    self.trace(
                        TraceBuilder::new(self.run_id, TraceStage::Ingest)
                            .recording(&name)
                            .progress(progress, format!("Skipped: {}", e)),
                    )?;
                    report.skipped.push(SkippedRecording {
                        name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            self.trace(
                TraceBuilder::new(self.run_id, TraceStage::Ingest)
                    .recording(&name)
                    .with_data(
                        progress,
                        "Loaded recording",
                        serde_json::json!({
                            "gesture": recording.label.gesture,
                            "tempo": recording.label.tempo,
                            "accelerometer_samples": recording.accelerometer.len(),
                            "gyroscope_samples": recording.gyroscope.len(),
                        }),
                    ),
            )?;

            let analysis = self.segmenter.analyze(&recording);

            self.trace(
                TraceBuilder::new(self.run_id, TraceStage::Peaks)
                    .recording(&name)
                    .with_data(
                        progress,
                        "Detected peaks",
                        serde_json::json!({
                            "primary_peaks": analysis.primary_peaks,
                            "secondary_peaks": analysis.secondary_peaks,
                            "onset_ranges": analysis.onset_ranges.as_slice(),
                        }),
                    ),
            )?;

            let summary =
                self.segmenter
                    .segment_analyzed(&recording, &analysis, &mut self.rng, sink)?;

            log::info!(
                "({}/{}) done. {} gestures + {}/{} non-gestures.",
                idx + 1,
                total,
                summary.onset_emitted,
                summary.background_emitted,
                summary.background_seen
            );
            if summary.onset_discarded > 0 {
                log::debug!(
                    "{}: {} onset centers too close to the recording edge",
                    name,
                    summary.onset_discarded
                );
            }

            self.trace(
                TraceBuilder::new(self.run_id, TraceStage::Segmentation)
                    .recording(&name)
                    .with_data(
                        progress,
                        "Segmented recording",
                        serde_json::to_value(&summary).map_err(TraceError::from)?,
                    ),
            )?;

            report.summaries.push(summary);
        }

        self.trace(
            TraceBuilder::new(self.run_id, TraceStage::Batch).with_data(
                1.0,
                "Batch complete",
                serde_json::json!({
                    "recordings": report.summaries.len(),
                    "skipped": report.skipped.len(),
                    "onset_emitted": report.onset_emitted(),
                    "background_emitted": report.background_emitted(),
                }),
            ),
        )?;

        Ok(report)
    }

    fn trace(&self, entry: TraceEntry) -> Result<(), TraceError> {
        match &self.trace {
            Some(writer) => writer.write(&entry),
            None => Ok(()),
        }
    }
}
