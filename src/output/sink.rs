// Example sink abstraction
// Receives completed examples; the segmenter never touches files directly

use thiserror::Error;

use crate::windows::LabeledExample;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Destination for labeled examples
pub trait ExampleSink {
    fn write(&mut self, example: &LabeledExample) -> Result<(), SinkError>;
}

/// Keeps examples in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub examples: Vec<LabeledExample>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExampleSink for MemorySink {
    fn write(&mut self, example: &LabeledExample) -> Result<(), SinkError> {
        self.examples.push(example.clone());
        Ok(())
    }
}
