// CSV directory sink
// Writes each example as a headerless CSV file under its class directory

use csv::WriterBuilder;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::output::sink::{ExampleSink, SinkError};
use crate::windows::{LabeledExample, BACKGROUND_LABEL};

/// Reset the output tree: remove any previous run, recreate the root and the
/// background class directory
pub fn prepare_output_dir(root: &Path) -> Result<(), SinkError> {
    if root.exists() {
        fs::remove_dir_all(root)?;
    }
    fs::create_dir_all(root.join(BACKGROUND_LABEL))?;
    Ok(())
}

/// Writes examples to `<root>/<class>/<tag>_<seq>_<start>_<end>.csv`
///
/// Rows are primary window first, then secondary, each row
/// `index,type,timestamp,x,y,z,energy`. Files are never appended to: when two
/// recordings of the same class produce the same name, the later example gets
/// a `_<n>` suffix before the extension.
pub struct CsvDirectorySink {
    root: PathBuf,
    written: usize,
}

impl CsvDirectorySink {
    pub fn new(root: PathBuf) -> Self {
        CsvDirectorySink { root, written: 0 }
    }

    /// Number of examples written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Path an example is written to
    pub fn path_for(&self, example: &LabeledExample) -> PathBuf {
        self.root
            .join(example.class.dir_name())
            .join(example.file_name())
    }
}

impl ExampleSink for CsvDirectorySink {
    fn write(&mut self, example: &LabeledExample) -> Result<(), SinkError> {
        let path = self.path_for(example);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let (path, file) = create_unique(&path)?;
        log::trace!("Writing example {}", path.display());

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        for row in example.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;

        self.written += 1;
        Ok(())
    }
}

/// Create `path`, or the first free `<stem>_<n>.<ext>` next to it
fn create_unique(path: &Path) -> Result<(PathBuf, File), SinkError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());

    let mut candidate = path.to_path_buf();
    let mut n = 0;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                n += 1;
                candidate = path.with_file_name(format!("{}_{}.{}", stem, n, ext));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorKind;
    use crate::windows::{ExampleClass, Window, WindowRow, BACKGROUND_TEMPO};
    use tempfile::TempDir;

    fn row(index: usize, kind: SensorKind) -> WindowRow {
        WindowRow {
            index,
            kind,
            timestamp: index as f64 * 5.0,
            x: 1.5,
            y: -2.0,
            z: 0.25,
            energy: 2.5,
            padding: false,
        }
    }

    fn example(class: ExampleClass, tag: &str) -> LabeledExample {
        LabeledExample {
            class,
            tag: tag.to_string(),
            sequence_id: 0,
            start_index: 10,
            end_index: 12,
            start_time: 50.0,
            end_time: 60.0,
            primary: Window {
                kind: SensorKind::Accelerometer,
                rows: vec![row(10, SensorKind::Accelerometer), row(11, SensorKind::Accelerometer)],
            },
            secondary: Window {
                kind: SensorKind::Gyroscope,
                rows: vec![row(4, SensorKind::Gyroscope), WindowRow::padding(1, SensorKind::Gyroscope)],
            },
        }
    }

    #[test]
    fn test_prepare_output_dir_resets_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("parsed");
        fs::create_dir_all(root.join("gesture-up")).unwrap();
        fs::write(root.join("gesture-up").join("stale.csv"), "old").unwrap();

        prepare_output_dir(&root).unwrap();

        assert!(root.join(BACKGROUND_LABEL).is_dir());
        assert!(!root.join("gesture-up").exists());
    }

    #[test]
    fn test_example_layout() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = CsvDirectorySink::new(temp_dir.path().to_path_buf());
        let ex = example(ExampleClass::Gesture("gesture-up".into()), "bpm60");

        sink.write(&ex).unwrap();

        let path = temp_dir.path().join("gesture-up").join("bpm60_0_50_60.csv");
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(sink.written(), 1);

        let first: Vec<&str> = lines[0].split(',').collect();
        assert_eq!(first.len(), 7);
        assert_eq!(first[0], "10");
        assert_eq!(first[1], "ACCELEROMETER");
        assert_eq!(first[2].parse::<f64>().unwrap(), 50.0);
        assert_eq!(first[6].parse::<f64>().unwrap(), 2.5);

        let secondary: Vec<&str> = lines[2].split(',').collect();
        assert_eq!(secondary[1], "GYROSCOPE");

        let padding: Vec<&str> = lines[3].split(',').collect();
        assert_eq!(padding[0], "1");
        assert_eq!(padding[1], "GYROSCOPE");
        for field in &padding[2..] {
            assert_eq!(field.parse::<f64>().unwrap(), 0.0);
        }
    }

    #[test]
    fn test_background_goes_to_none_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = CsvDirectorySink::new(temp_dir.path().to_path_buf());
        let ex = example(ExampleClass::Background, BACKGROUND_TEMPO);

        sink.write(&ex).unwrap();

        assert!(temp_dir
            .path()
            .join(BACKGROUND_LABEL)
            .join("bpm0_0_50_60.csv")
            .is_file());
    }

    #[test]
    fn test_same_name_does_not_append() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = CsvDirectorySink::new(temp_dir.path().to_path_buf());
        let ex = example(ExampleClass::Gesture("gesture-up".into()), "bpm60");

        sink.write(&ex).unwrap();
        sink.write(&ex).unwrap();
        sink.write(&ex).unwrap();

        let dir = temp_dir.path().join("gesture-up");
        for name in ["bpm60_0_50_60.csv", "bpm60_0_50_60_1.csv", "bpm60_0_50_60_2.csv"] {
            let contents = fs::read_to_string(dir.join(name)).unwrap();
            assert_eq!(contents.lines().count(), 4, "{}", name);
        }
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 3);
        assert_eq!(sink.written(), 3);
    }
}
