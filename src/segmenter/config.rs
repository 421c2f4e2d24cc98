// Segmenter configuration
// Window geometry, peak picking, background rate, stream roles, and RNG seeding

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::onsets::PeakConfig;
use crate::sensor::SensorKind;
use crate::windows::WindowConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Full set of segmentation parameters
/// Every field falls back to its default when absent from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub window: WindowConfig,

    pub peaks: PeakConfig,

    /// Samples on each side of a peak still treated as an onset center
    pub peak_radius: usize,

    /// Probability that a background index is sampled as a window [0.0, 1.0]
    pub background_rate: f64,

    /// Seed for background sampling; None draws one from the OS
    pub seed: Option<u64>,

    /// Indices between progress log lines
    pub progress_interval: usize,

    /// Stream that drives onset detection and window placement
    pub primary: SensorKind,

    /// Stream aligned to the primary by timestamp
    pub secondary: SensorKind,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        SegmenterConfig {
            window: WindowConfig::default(),
            peaks: PeakConfig::default(),
            peak_radius: 10,
            background_rate: 0.1,
            seed: None,
            progress_interval: 1000,
            primary: SensorKind::Accelerometer,
            secondary: SensorKind::Gyroscope,
        }
    }
}

impl SegmenterConfig {
    /// Check parameter ranges before any recording is touched
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.length == 0 {
            return Err(ConfigError::Invalid("window length must be positive".into()));
        }
        if self.window.offset >= self.window.length {
            return Err(ConfigError::Invalid(format!(
                "window offset {} must be smaller than window length {}",
                self.window.offset, self.window.length
            )));
        }
        if self.peaks.min_separation == 0 {
            return Err(ConfigError::Invalid("peak separation must be at least 1".into()));
        }
        if let Some(height) = self.peaks.height {
            if !height.is_finite() {
                return Err(ConfigError::Invalid("peak height must be finite".into()));
            }
        }
        if !(0.0..=1.0).contains(&self.background_rate) {
            return Err(ConfigError::Invalid(format!(
                "background rate {} outside [0, 1]",
                self.background_rate
            )));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid("progress interval must be positive".into()));
        }
        if self.primary == self.secondary {
            return Err(ConfigError::Invalid(format!(
                "primary and secondary streams are both {}",
                self.primary.as_str()
            )));
        }
        Ok(())
    }

    /// Random source for background sampling
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Load a JSON config file; missing fields take their defaults
pub fn load_config(path: &Path) -> Result<SegmenterConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: SegmenterConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SegmenterConfig::default();
        assert_eq!(config.window.length, 50);
        assert_eq!(config.window.offset, 35);
        assert_eq!(config.peaks.min_separation, 100);
        assert_eq!(config.peak_radius, 10);
        assert_eq!(config.background_rate, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_parameters() {
        let mut config = SegmenterConfig::default();
        config.window.offset = 50;
        assert!(config.validate().is_err());

        let mut config = SegmenterConfig::default();
        config.background_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = SegmenterConfig::default();
        config.background_rate = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SegmenterConfig::default();
        config.secondary = SensorKind::Accelerometer;
        assert!(config.validate().is_err());

        let mut config = SegmenterConfig::default();
        config.peaks.min_separation = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "background_rate": 0.0, "window": { "length": 64 }, "seed": 7 }"#;
        let config: SegmenterConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.background_rate, 0.0);
        assert_eq!(config.window.length, 64);
        assert_eq!(config.window.offset, 35);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.primary, SensorKind::Accelerometer);
    }

    #[test]
    fn test_load_config_validates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        fs::write(&path, r#"{ "peak_radius": 4 }"#).unwrap();
        assert_eq!(load_config(&path).unwrap().peak_radius, 4);

        fs::write(&path, r#"{ "background_rate": -0.1 }"#).unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let config = SegmenterConfig {
            seed: Some(42),
            ..SegmenterConfig::default()
        };

        let mut rng1 = config.rng();
        let mut rng2 = config.rng();
        let b: Vec<f64> = (0..5).map(|_| rng1.gen()).collect();
        let c: Vec<f64> = (0..5).map(|_| rng2.gen()).collect();
        assert_eq!(b, c);

        let other = SegmenterConfig {
            seed: Some(43),
            ..SegmenterConfig::default()
        };
        let mut rng3 = other.rng();
        let d: Vec<f64> = (0..5).map(|_| rng3.gen()).collect();
        assert_ne!(b, d);
    }
}
