// Onset detection module
// Peak picking on the motion energy signal and onset range membership

pub mod peaks;
pub mod ranges;

pub use peaks::{find_peaks, PeakConfig};
pub use ranges::{PeakRange, PeakRanges};
