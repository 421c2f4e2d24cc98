// Segmentation engine
// Walks the primary stream index by index, emitting onset windows and
// sampled background windows

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::onsets::{find_peaks, PeakRanges};
use crate::output::{ExampleSink, SinkError};
use crate::segmenter::config::{ConfigError, SegmenterConfig};
use crate::segmenter::sampler::BackgroundSampler;
use crate::sensor::Recording;
use crate::windows::{ExampleClass, StreamView, WindowExtractor, BACKGROUND_TEMPO};

/// Counts produced by one recording's segmentation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationSummary {
    pub recording: String,

    /// Onset windows written
    pub onset_emitted: u64,

    /// Onset centers too close to a recording edge
    pub onset_discarded: u64,

    /// Indices classified as background
    pub background_seen: u64,

    /// Background indices picked by the sampler
    pub background_selected: u64,

    /// Background windows written
    pub background_emitted: u64,
}

/// Per-recording signal analysis shared by segmentation and diagnostics
pub struct RecordingAnalysis<'a> {
    pub primary: StreamView<'a>,
    pub secondary: StreamView<'a>,

    /// Peaks driving onset classification
    pub primary_peaks: Vec<usize>,

    /// Diagnostic only
    pub secondary_peaks: Vec<usize>,

    pub onset_ranges: PeakRanges,
}

/// Segments recordings into labeled examples
///
/// The background sequence id spans every recording handed to the same
/// segmenter, so background files from different recordings never collide.
pub struct Segmenter {
    config: SegmenterConfig,
    sampler: BackgroundSampler,
    background_sequence: u64,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sampler = BackgroundSampler::new(config.background_rate);

        Ok(Segmenter {
            config,
            sampler,
            background_sequence: 0,
        })
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Next background sequence id to be assigned
    pub fn background_sequence(&self) -> u64 {
        self.background_sequence
    }

    /// Compute energy, peaks, and onset ranges for both streams
    pub fn analyze<'a>(&self, recording: &'a Recording) -> RecordingAnalysis<'a> {
        let primary = StreamView::new(recording.stream(self.config.primary));
        let secondary = StreamView::new(recording.stream(self.config.secondary));

        let primary_peaks = find_peaks(&primary.energy, &self.config.peaks);
        let secondary_peaks = find_peaks(&secondary.energy, &self.config.peaks);
        let onset_ranges =
            PeakRanges::expand(&primary_peaks, primary.len(), self.config.peak_radius);

        log::debug!(
            "{}: {} primary peaks, {} secondary peaks, {} onset ranges",
            recording.name,
            primary_peaks.len(),
            secondary_peaks.len(),
            onset_ranges.len()
        );

        RecordingAnalysis {
            primary,
            secondary,
            primary_peaks,
            secondary_peaks,
            onset_ranges,
        }
    }

    /// Analyze and segment one recording
    pub fn segment<R, S>(
        &mut self,
        recording: &Recording,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<SegmentationSummary, SinkError>
    where
        R: Rng + ?Sized,
        S: ExampleSink + ?Sized,
    {
        let analysis = self.analyze(recording);
        self.segment_analyzed(recording, &analysis, rng, sink)
    }

    /// Segment a recording whose analysis is already available
    ///
    /// Indices are visited in ascending order. An index inside an onset range
    /// becomes an onset window; any other index is a background candidate
    /// sampled with the configured rate. Sequence counters only advance when
    /// a window is actually written.
    pub fn segment_analyzed<R, S>(
        &mut self,
        recording: &Recording,
        analysis: &RecordingAnalysis<'_>,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<SegmentationSummary, SinkError>
    where
        R: Rng + ?Sized,
        S: ExampleSink + ?Sized,
    {
        let extractor = WindowExtractor::new(
            self.config.window.clone(),
            &analysis.primary,
            &analysis.secondary,
        );
        let gesture = ExampleClass::Gesture(recording.label.gesture.clone());
        let len = analysis.primary.len();

        let mut summary = SegmentationSummary {
            recording: recording.name.clone(),
            ..SegmentationSummary::default()
        };
        let mut onset_sequence: u64 = 0;

        for idx in 0..len {
            if analysis.onset_ranges.contains(idx) {
                match extractor.extract(idx, gesture.clone(), &recording.label.tempo, onset_sequence) {
                    Some(example) => {
                        sink.write(&example)?;
                        onset_sequence += 1;
                        summary.onset_emitted += 1;
                    }
                    None => summary.onset_discarded += 1,
                }
            } else {
                summary.background_seen += 1;

                if self.sampler.select(rng) {
                    summary.background_selected += 1;

                    let example = extractor.extract(
                        idx,
                        ExampleClass::Background,
                        BACKGROUND_TEMPO,
                        self.background_sequence,
                    );
                    if let Some(example) = example {
                        sink.write(&example)?;
                        self.background_sequence += 1;
                        summary.background_emitted += 1;
                    }
                }
            }

            if idx % self.config.progress_interval == 0 {
                log::debug!("  progress {}/{}", idx, len);
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use crate::sensor::{LabelTag, RecordingSchema, SensorKind, SensorSample, SensorStream};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Baseline energy 1 with optional spikes, 5ms primary / 5ms secondary
    fn recording(len: usize, spikes: &[(usize, f64)]) -> Recording {
        let samples = (0..len)
            .map(|i| {
                let x = spikes
                    .iter()
                    .find(|(at, _)| *at == i)
                    .map(|(_, v)| *v)
                    .unwrap_or(1.0);
                SensorSample::new(i as f64 * 5.0, x, 0.0, 0.0)
            })
            .collect();
        let gyro = (0..len)
            .map(|i| SensorSample::new(i as f64 * 5.0 + 1.0, 0.0, 0.5, 0.0))
            .collect();

        Recording {
            name: "gesture-up-bpm60-test.csv".to_string(),
            label: LabelTag::new("gesture-up", "bpm60"),
            schema: RecordingSchema::default(),
            accelerometer: SensorStream::new(SensorKind::Accelerometer, samples),
            gyroscope: SensorStream::new(SensorKind::Gyroscope, gyro),
        }
    }

    fn config(background_rate: f64, peak_radius: usize) -> SegmenterConfig {
        SegmenterConfig {
            background_rate,
            peak_radius,
            seed: Some(11),
            ..SegmenterConfig::default()
        }
    }

    #[test]
    fn test_single_spike_single_onset() {
        let rec = recording(200, &[(100, 10.0)]);
        let mut segmenter = Segmenter::new(config(0.0, 0)).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut sink = MemorySink::new();

        let summary = segmenter.segment(&rec, &mut rng, &mut sink).unwrap();

        assert_eq!(summary.onset_emitted, 1);
        assert_eq!(summary.background_emitted, 0);
        assert_eq!(sink.examples.len(), 1);

        let ex = &sink.examples[0];
        assert_eq!(ex.start_index, 65);
        assert_eq!(ex.end_index, 115);
        assert_eq!(ex.class, ExampleClass::Gesture("gesture-up".into()));
        assert_eq!(ex.tag, "bpm60");
        assert_eq!(ex.sequence_id, 0);
        assert_eq!(ex.primary.len(), 50);
        assert_eq!(ex.secondary.len(), 50);
    }

    #[test]
    fn test_default_radius_windows_every_center_in_range() {
        let rec = recording(200, &[(100, 10.0)]);
        let mut segmenter = Segmenter::new(config(0.0, 10)).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut sink = MemorySink::new();

        let summary = segmenter.segment(&rec, &mut rng, &mut sink).unwrap();

        // Centers 90..=110
        assert_eq!(summary.onset_emitted, 21);
        let ids: Vec<u64> = sink.examples.iter().map(|e| e.sequence_id).collect();
        assert_eq!(ids, (0..21).collect::<Vec<u64>>());
        assert!(sink.examples.iter().any(|e| e.start_index == 65 && e.end_index == 115));
        assert_eq!(summary.background_seen, 179);
    }

    #[test]
    fn test_onset_near_edge_discarded_without_gap_in_ids() {
        // Range 10..=30 lies entirely inside the leading boundary
        let rec = recording(300, &[(20, 10.0), (200, 10.0)]);
        let mut cfg = config(0.0, 10);
        cfg.peaks.min_separation = 50;
        let mut segmenter = Segmenter::new(cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut sink = MemorySink::new();

        let summary = segmenter.segment(&rec, &mut rng, &mut sink).unwrap();

        assert_eq!(summary.onset_discarded, 21);
        assert_eq!(summary.onset_emitted, 21);
        assert_eq!(sink.examples.first().unwrap().sequence_id, 0);
        assert_eq!(sink.examples.first().unwrap().start_index, 155);
    }

    #[test]
    fn test_background_ids_continue_across_recordings() {
        let rec = recording(400, &[]);
        let mut segmenter = Segmenter::new(config(0.2, 10)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut sink = MemorySink::new();

        let first = segmenter.segment(&rec, &mut rng, &mut sink).unwrap();
        let second = segmenter.segment(&rec, &mut rng, &mut sink).unwrap();

        let total = first.background_emitted + second.background_emitted;
        assert!(total > 0);
        assert_eq!(segmenter.background_sequence(), total);

        let ids: Vec<u64> = sink.examples.iter().map(|e| e.sequence_id).collect();
        assert_eq!(ids, (0..total).collect::<Vec<u64>>());
        assert!(sink
            .examples
            .iter()
            .all(|e| e.class == ExampleClass::Background && e.tag == BACKGROUND_TEMPO));
    }

    #[test]
    fn test_selected_background_near_edge_not_emitted() {
        let rec = recording(100, &[]);
        let mut segmenter = Segmenter::new(config(1.0, 10)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut sink = MemorySink::new();

        let summary = segmenter.segment(&rec, &mut rng, &mut sink).unwrap();

        assert_eq!(summary.background_seen, 100);
        assert_eq!(summary.background_selected, 100);
        // Valid centers: start in 1..=49 -> center in 36..=84
        assert_eq!(summary.background_emitted, 49);
        assert_eq!(segmenter.background_sequence(), 49);
    }

    #[test]
    fn test_same_seed_same_output() {
        let rec = recording(600, &[(150, 8.0), (400, 9.0)]);

        let run = || {
            let mut segmenter = Segmenter::new(config(0.1, 10)).unwrap();
            let mut rng = StdRng::seed_from_u64(77);
            let mut sink = MemorySink::new();
            segmenter.segment(&rec, &mut rng, &mut sink).unwrap();
            sink.examples
                .iter()
                .map(|e| (e.class.clone(), e.sequence_id, e.start_index))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_every_example_fixed_size() {
        let rec = recording(1000, &[(120, 6.0), (400, 7.0), (800, 9.0)]);
        let mut segmenter = Segmenter::new(config(0.3, 10)).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let mut sink = MemorySink::new();

        segmenter.segment(&rec, &mut rng, &mut sink).unwrap();

        assert!(!sink.examples.is_empty());
        for ex in &sink.examples {
            assert_eq!(ex.primary.len(), 50);
            assert_eq!(ex.secondary.len(), 50);
        }
    }

    #[test]
    fn test_analysis_reports_both_streams() {
        let rec = recording(300, &[(150, 10.0)]);
        let segmenter = Segmenter::new(config(0.0, 10)).unwrap();

        let analysis = segmenter.analyze(&rec);

        assert_eq!(analysis.primary_peaks, vec![150]);
        // Constant gyroscope energy has no peaks
        assert!(analysis.secondary_peaks.is_empty());
        assert_eq!(analysis.onset_ranges.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut cfg = SegmenterConfig::default();
        cfg.window.length = 0;
        assert!(Segmenter::new(cfg).is_err());
    }
}
