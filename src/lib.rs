// Gesture Slicer - IMU recordings to labeled gesture windows
// Module declarations

pub mod onsets;
pub mod output;
pub mod pipeline;
pub mod segmenter;
pub mod sensor;
pub mod windows;

pub use pipeline::{BatchError, BatchReport, BatchRunner};
pub use segmenter::{SegmentationSummary, Segmenter, SegmenterConfig};
