// Recording ingestion module
// Reads raw CSV recordings, demultiplexes sensor streams, and derives the label

use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::sensor::types::{LabelTag, Recording, RecordingSchema, SensorKind, SensorSample, SensorStream};

/// A recording that cannot be segmented
/// Surfaced per recording; the batch decides whether to continue
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("Failed to open recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse recording CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Header has {found} columns, expected type, timestamp, x, y, z")]
    MissingColumns { found: usize },

    #[error("Invalid {column} value {value:?} on row {row}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Cannot derive a label from file name {0:?}")]
    InvalidName(String),

    #[error("No {0:?} samples in recording")]
    EmptyStream(SensorKind),

    #[error("{0:?} timestamps are not in ascending order")]
    UnorderedTimestamps(SensorKind),
}

/// Derive the gesture label from a recording file name
/// `gesture-up-bpm60-take3.csv` -> gesture `gesture-up`, tempo `bpm60`
pub fn parse_label(file_name: &str) -> Result<LabelTag, RecordingError> {
    let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
    let parts: Vec<&str> = stem.split('-').collect();

    if parts.len() < 3 || parts[..3].iter().any(|p| p.is_empty()) {
        return Err(RecordingError::InvalidName(file_name.to_string()));
    }

    Ok(LabelTag::new(parts[..2].join("-"), parts[2]))
}

/// Load a recording from a CSV file on disk
pub fn load_recording(path: &Path) -> Result<Recording, RecordingError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let file = File::open(path)?;
    read_recording(&name, file)
}

/// Read a recording from any CSV source
///
/// The first five header columns are taken as type, timestamp, x, y, z.
/// Timestamps are shifted so the earliest sample of the whole recording is
/// at zero; both streams share that origin.
pub fn read_recording<R: Read>(name: &str, source: R) -> Result<Recording, RecordingError> {
    let label = parse_label(name)?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);
    let schema = schema_from_header(reader.headers()?)?;

    let mut accelerometer = Vec::new();
    let mut gyroscope = Vec::new();
    let mut min_time = f64::INFINITY;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        // Header is line 1
        let row = row_idx + 2;

        let timestamp = parse_field(&record, 1, &schema.time_column, row)?;
        min_time = min_time.min(timestamp);

        let Some(kind) = record.get(0).and_then(SensorKind::parse) else {
            continue;
        };

        let sample = SensorSample::new(
            timestamp,
            parse_field(&record, 2, &schema.x_column, row)?,
            parse_field(&record, 3, &schema.y_column, row)?,
            parse_field(&record, 4, &schema.z_column, row)?,
        );

        match kind {
            SensorKind::Accelerometer => accelerometer.push(sample),
            SensorKind::Gyroscope => gyroscope.push(sample),
        }
    }

    let accelerometer = finish_stream(SensorKind::Accelerometer, accelerometer, min_time)?;
    let gyroscope = finish_stream(SensorKind::Gyroscope, gyroscope, min_time)?;

    log::debug!(
        "Loaded {}: {} accelerometer, {} gyroscope samples",
        name,
        accelerometer.len(),
        gyroscope.len()
    );

    Ok(Recording {
        name: name.to_string(),
        label,
        schema,
        accelerometer,
        gyroscope,
    })
}

fn schema_from_header(header: &StringRecord) -> Result<RecordingSchema, RecordingError> {
    if header.len() < 5 {
        return Err(RecordingError::MissingColumns {
            found: header.len(),
        });
    }

    Ok(RecordingSchema {
        type_column: header[0].trim().to_string(),
        time_column: header[1].trim().to_string(),
        x_column: header[2].trim().to_string(),
        y_column: header[3].trim().to_string(),
        z_column: header[4].trim().to_string(),
    })
}

fn parse_field(
    record: &StringRecord,
    idx: usize,
    column: &str,
    row: usize,
) -> Result<f64, RecordingError> {
    let raw = record.get(idx).unwrap_or_default().trim();
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RecordingError::InvalidNumber {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

fn finish_stream(
    kind: SensorKind,
    mut samples: Vec<SensorSample>,
    origin: f64,
) -> Result<SensorStream, RecordingError> {
    if samples.is_empty() {
        return Err(RecordingError::EmptyStream(kind));
    }

    for sample in samples.iter_mut() {
        sample.timestamp -= origin;
    }

    let stream = SensorStream::new(kind, samples);
    if !stream.is_time_ordered() {
        return Err(RecordingError::UnorderedTimestamps(kind));
    }

    Ok(stream)
}
