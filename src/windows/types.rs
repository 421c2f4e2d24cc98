// Window types
// Fixed-length window rows and the labeled example written for training

use serde::{Deserialize, Serialize};

use crate::sensor::SensorKind;

/// Output directory name for background examples
pub const BACKGROUND_LABEL: &str = "gesture-none";

/// Tempo tag used in background example file names
pub const BACKGROUND_TEMPO: &str = "bpm0";

/// One serialized row of a window
/// Field order is the column order consumed by the model loader:
/// index, type, timestamp, x, y, z, energy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRow {
    /// Index of the sample in its stream, or the row position for padding
    pub index: usize,
    pub kind: SensorKind,
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub energy: f64,
    /// Set only on filler rows; not part of the serialized layout
    #[serde(skip)]
    pub padding: bool,
}

impl WindowRow {
    /// Synthetic filler row: sensor marker kept, every numeric field zero
    pub fn padding(position: usize, kind: SensorKind) -> Self {
        WindowRow {
            index: position,
            kind,
            timestamp: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            energy: 0.0,
            padding: true,
        }
    }

    pub fn is_padding(&self) -> bool {
        self.padding
    }
}

/// Contiguous slice of one stream
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub kind: SensorKind,
    pub rows: Vec<WindowRow>,
}

impl Window {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Class an example is filed under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExampleClass {
    /// Window centered near a detected onset of the named gesture
    Gesture(String),

    /// Randomly sampled window away from any onset
    Background,
}

impl ExampleClass {
    /// Directory the example belongs in
    pub fn dir_name(&self) -> &str {
        match self {
            ExampleClass::Gesture(name) => name,
            ExampleClass::Background => BACKGROUND_LABEL,
        }
    }
}

/// A pair of equally sized windows, one per stream, sharing a label
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledExample {
    pub class: ExampleClass,

    /// Tempo tag used in the file name ("bpm60", or "bpm0" for background)
    pub tag: String,

    /// Unique per class output location
    pub sequence_id: u64,

    /// Primary index range `[start_index, end_index)`
    pub start_index: usize,
    pub end_index: usize,

    /// Primary timestamps at `start_index` and `end_index`
    pub start_time: f64,
    pub end_time: f64,

    pub primary: Window,
    pub secondary: Window,
}

impl LabeledExample {
    /// `<tag>_<sequence>_<start>_<end>.csv`, times truncated to whole units
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}.csv",
            self.tag, self.sequence_id, self.start_time as i64, self.end_time as i64
        )
    }

    /// Primary rows followed by secondary rows
    pub fn rows(&self) -> impl Iterator<Item = &WindowRow> {
        self.primary.rows.iter().chain(self.secondary.rows.iter())
    }
}
