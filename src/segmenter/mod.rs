// Segmentation module
// Configuration, background sampling, and the per-recording segmentation pass

pub mod config;
pub mod engine;
pub mod sampler;

pub use config::{load_config, ConfigError, SegmenterConfig};
pub use engine::{RecordingAnalysis, SegmentationSummary, Segmenter};
pub use sampler::BackgroundSampler;
