// Motion energy signal
// Scalar per-sample energy used for onset detection

use crate::sensor::types::{SensorSample, SensorStream};

/// Euclidean norm of a sample's 3-axis vector
pub fn sample_energy(sample: &SensorSample) -> f64 {
    (sample.x * sample.x + sample.y * sample.y + sample.z * sample.z).sqrt()
}

/// Energy sequence for a stream, index-aligned with its samples
pub fn motion_energy(stream: &SensorStream) -> Vec<f64> {
    stream.samples.iter().map(sample_energy).collect()
}
