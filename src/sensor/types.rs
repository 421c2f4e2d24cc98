// Sensor data types
// Defines sensor kinds, timestamped 3-axis samples, streams, and recordings

use serde::{Deserialize, Serialize};

/// Sensor that produced a sample
/// The serialized form matches the type marker used in raw recordings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
}

impl SensorKind {
    /// Parse the type marker found in a raw recording row
    /// Returns None for sensor types this tool does not segment
    pub fn parse(marker: &str) -> Option<Self> {
        match marker.trim() {
            "ACCELEROMETER" => Some(SensorKind::Accelerometer),
            "GYROSCOPE" => Some(SensorKind::Gyroscope),
            _ => None,
        }
    }

    /// Type marker as written in raw recordings and output examples
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "ACCELEROMETER",
            SensorKind::Gyroscope => "GYROSCOPE",
        }
    }
}

/// A single timestamped 3-axis reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Milliseconds since the start of the recording
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SensorSample {
    pub fn new(timestamp: f64, x: f64, y: f64, z: f64) -> Self {
        SensorSample { timestamp, x, y, z }
    }
}

/// Ordered samples from one sensor
/// Index position is a sample's identity for the duration of a segmentation pass
#[derive(Debug, Clone)]
pub struct SensorStream {
    pub kind: SensorKind,
    pub samples: Vec<SensorSample>,
}

impl SensorStream {
    pub fn new(kind: SensorKind, samples: Vec<SensorSample>) -> Self {
        SensorStream { kind, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp column, in index order
    pub fn timestamps(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    /// Whether timestamps never decrease along the stream
    pub fn is_time_ordered(&self) -> bool {
        self.samples
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }
}

/// Column names captured from a recording's header row
/// Carried with the recording instead of living in shared process state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSchema {
    pub type_column: String,
    pub time_column: String,
    pub x_column: String,
    pub y_column: String,
    pub z_column: String,
}

impl Default for RecordingSchema {
    fn default() -> Self {
        RecordingSchema {
            type_column: "type".to_string(),
            time_column: "timestamp".to_string(),
            x_column: "x".to_string(),
            y_column: "y".to_string(),
            z_column: "z".to_string(),
        }
    }
}

/// Gesture label derived from a recording's filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTag {
    /// Gesture class, e.g. "gesture-up"
    pub gesture: String,

    /// Tempo marker, e.g. "bpm60"
    pub tempo: String,
}

impl LabelTag {
    pub fn new(gesture: impl Into<String>, tempo: impl Into<String>) -> Self {
        LabelTag {
            gesture: gesture.into(),
            tempo: tempo.into(),
        }
    }
}

/// One raw recording, already demultiplexed per sensor
#[derive(Debug, Clone)]
pub struct Recording {
    /// Source name (usually the file name)
    pub name: String,
    pub label: LabelTag,
    pub schema: RecordingSchema,
    pub accelerometer: SensorStream,
    pub gyroscope: SensorStream,
}

impl Recording {
    /// Stream recorded by the given sensor
    pub fn stream(&self, kind: SensorKind) -> &SensorStream {
        match kind {
            SensorKind::Accelerometer => &self.accelerometer,
            SensorKind::Gyroscope => &self.gyroscope,
        }
    }
}
