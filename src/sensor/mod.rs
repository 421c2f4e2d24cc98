// Sensor data module
// Sample streams, motion energy, and recording ingestion

pub mod energy;
pub mod ingest;
pub mod types;

pub use energy::motion_energy;
pub use ingest::{load_recording, parse_label, read_recording, RecordingError};
pub use types::{LabelTag, Recording, RecordingSchema, SensorKind, SensorSample, SensorStream};
