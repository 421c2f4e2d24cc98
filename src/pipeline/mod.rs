// Pipeline execution and monitoring module
// Runs batches of recordings and traces their progress

pub mod batch;
pub mod trace;

pub use batch::{check_disjoint, list_recordings, BatchError, BatchReport, BatchRunner, SkippedRecording};
pub use trace::{read_trace_file, TraceBuilder, TraceEntry, TraceError, TraceStage, TraceWriter};
