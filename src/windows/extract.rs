// Window extraction
// Derives fixed-size primary/secondary windows around a center index

use serde::{Deserialize, Serialize};

use crate::sensor::{motion_energy, SensorStream};
use crate::windows::align::align_interval;
use crate::windows::types::{ExampleClass, LabeledExample, Window, WindowRow};

/// Window geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Samples per window, for both streams
    pub length: usize,

    /// Samples between the window start and its center index
    pub offset: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        // 50 samples at ~5ms each is roughly 250ms of motion
        WindowConfig {
            length: 50,
            offset: 35,
        }
    }
}

/// A stream together with the per-index values windowing needs
#[derive(Debug, Clone)]
pub struct StreamView<'a> {
    pub stream: &'a SensorStream,
    pub energy: Vec<f64>,
    pub timestamps: Vec<f64>,
}

impl<'a> StreamView<'a> {
    pub fn new(stream: &'a SensorStream) -> Self {
        StreamView {
            stream,
            energy: motion_energy(stream),
            timestamps: stream.timestamps(),
        }
    }

    pub fn len(&self) -> usize {
        self.stream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    fn row(&self, idx: usize) -> WindowRow {
        let sample = &self.stream.samples[idx];
        WindowRow {
            index: idx,
            kind: self.stream.kind,
            timestamp: sample.timestamp,
            x: sample.x,
            y: sample.y,
            z: sample.z,
            energy: self.energy[idx],
            padding: false,
        }
    }
}

/// Cuts labeled examples out of one recording's pair of streams
pub struct WindowExtractor<'a> {
    config: WindowConfig,
    primary: &'a StreamView<'a>,
    secondary: &'a StreamView<'a>,
}

impl<'a> WindowExtractor<'a> {
    pub fn new(
        config: WindowConfig,
        primary: &'a StreamView<'a>,
        secondary: &'a StreamView<'a>,
    ) -> Self {
        WindowExtractor {
            config,
            primary,
            secondary,
        }
    }

    /// Primary index range `[start, end)` for a center index
    ///
    /// None when the window would touch index 0 or when `end` is not a valid
    /// index (its timestamp bounds the secondary slice).
    pub fn bounds(&self, center: usize) -> Option<(usize, usize)> {
        let start = center.checked_sub(self.config.offset)?;
        let end = start + self.config.length;

        if start == 0 || end >= self.primary.len() {
            return None;
        }

        Some((start, end))
    }

    /// Build the example centered at `center`
    /// Returns None for boundary discards; nothing partial is ever produced.
    pub fn extract(
        &self,
        center: usize,
        class: ExampleClass,
        tag: &str,
        sequence_id: u64,
    ) -> Option<LabeledExample> {
        let (start, end) = self.bounds(center)?;

        let start_time = self.primary.timestamps[start];
        let end_time = self.primary.timestamps[end];

        let primary = Window {
            kind: self.primary.stream.kind,
            rows: (start..end).map(|idx| self.primary.row(idx)).collect(),
        };

        let secondary = self.secondary_window(start_time, end_time);

        Some(LabeledExample {
            class,
            tag: tag.to_string(),
            sequence_id,
            start_index: start,
            end_index: end,
            start_time,
            end_time,
            primary,
            secondary,
        })
    }

    /// Secondary samples in the same time span, padded or truncated to length
    fn secondary_window(&self, start_time: f64, end_time: f64) -> Window {
        let length = self.config.length;
        let kind = self.secondary.stream.kind;

        let (s_start, s_end) = align_interval(start_time, end_time, &self.secondary.timestamps);
        let s_end = s_end.min(s_start + length);

        let mut rows: Vec<WindowRow> = (s_start..s_end).map(|idx| self.secondary.row(idx)).collect();

        for position in rows.len()..length {
            rows.push(WindowRow::padding(position, kind));
        }

        Window { kind, rows }
    }
}
