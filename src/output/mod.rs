// Example output module
// Sinks that receive labeled examples from the segmenter

pub mod directory;
pub mod sink;

pub use directory::{prepare_output_dir, CsvDirectorySink};
pub use sink::{ExampleSink, MemorySink, SinkError};
