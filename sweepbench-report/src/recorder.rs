//! Measurement Recorder
//!
//! One append-only text sink per execution mode. Sinks are truncated when the
//! recorder is created (the start of a sweep) and only appended to afterwards.
//!
//! Row format: `setup,computation,finalization` in milliseconds with three
//! decimals, no header. A phase the workload did not report is an empty cell.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use sweepbench_core::{Measurement, Mode, ResultRecord, format_millis};
use thiserror::Error;

/// Field delimiter within a row
pub const FIELD_DELIMITER: char = ',';

/// A sink could not be created or durably appended to. Fatal for a sweep.
#[derive(Debug, Error)]
#[error("failed to write result sink {}: {source}", .path.display())]
pub struct SinkWriteError {
    /// Sink that failed
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}

impl SinkWriteError {
    fn new(path: &Path, source: std::io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File names of the two sinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkNames {
    /// Sink for sequential runs
    pub sequential: String,
    /// Sink for parallel runs
    pub parallel: String,
}

impl SinkNames {
    /// `<prefix>cpu_time.csv` and `<prefix>openmp_time.csv`
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            sequential: format!("{}{}_time.csv", prefix, Mode::Sequential.artifact_label()),
            parallel: format!("{}{}_time.csv", prefix, Mode::Parallel.artifact_label()),
        }
    }

    fn for_mode(&self, mode: Mode) -> &str {
        match mode {
            Mode::Sequential => &self.sequential,
            Mode::Parallel => &self.parallel,
        }
    }
}

impl Default for SinkNames {
    fn default() -> Self {
        Self::with_prefix("")
    }
}

struct Sink {
    path: PathBuf,
    file: File,
    rows: usize,
}

impl Sink {
    fn open_fresh(path: PathBuf) -> Result<Self, SinkWriteError> {
        // Truncate first, then reopen in append mode: the two flags cannot be combined.
        File::create(&path).map_err(|e| SinkWriteError::new(&path, e))?;
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| SinkWriteError::new(&path, e))?;
        Ok(Self { path, file, rows: 0 })
    }

    fn append(&mut self, row: &str) -> Result<(), SinkWriteError> {
        self.file
            .write_all(row.as_bytes())
            .and_then(|()| self.file.sync_data())
            .map_err(|e| SinkWriteError::new(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }
}

/// Owns the per-mode sinks of one sweep
pub struct MeasurementRecorder {
    sequential: Sink,
    parallel: Sink,
}

impl MeasurementRecorder {
    /// Create (or truncate) both sinks under `directory`, creating it if needed.
    pub fn create(directory: &Path, names: &SinkNames) -> Result<Self, SinkWriteError> {
        std::fs::create_dir_all(directory).map_err(|e| SinkWriteError::new(directory, e))?;

        let recorder = Self {
            sequential: Sink::open_fresh(directory.join(names.for_mode(Mode::Sequential)))?,
            parallel: Sink::open_fresh(directory.join(names.for_mode(Mode::Parallel)))?,
        };
        tracing::debug!(
            sequential = %recorder.sequential.path.display(),
            parallel = %recorder.parallel.path.display(),
            "result sinks initialised"
        );
        Ok(recorder)
    }

    /// Append one row to the sink of the record's mode.
    ///
    /// The row is rendered in full and handed to the OS in one append, then
    /// synced. A failure leaves no partial row counted as written.
    pub fn record(&mut self, record: &ResultRecord) -> Result<(), SinkWriteError> {
        let row = render_row(&record.measurement);
        self.sink_mut(record.configuration.mode()).append(&row)
    }

    /// Rows appended to a mode's sink since creation
    pub fn rows_written(&self, mode: Mode) -> usize {
        self.sink(mode).rows
    }

    /// Location of a mode's sink
    pub fn sink_path(&self, mode: Mode) -> &Path {
        &self.sink(mode).path
    }

    fn sink(&self, mode: Mode) -> &Sink {
        match mode {
            Mode::Sequential => &self.sequential,
            Mode::Parallel => &self.parallel,
        }
    }

    fn sink_mut(&mut self, mode: Mode) -> &mut Sink {
        match mode {
            Mode::Sequential => &mut self.sequential,
            Mode::Parallel => &mut self.parallel,
        }
    }
}

/// Render a measurement as one newline-terminated sink row
pub fn render_row(measurement: &Measurement) -> String {
    let mut row = measurement
        .fields()
        .into_iter()
        .map(|field| field.map(format_millis).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(&FIELD_DELIMITER.to_string());
    row.push('\n');
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use sweepbench_core::{ExperimentConfiguration, InputReference};

    fn measurement(setup: u64, computation: u64, finalization: u64) -> Measurement {
        Measurement {
            setup: Some(Duration::from_millis(setup)),
            computation: Some(Duration::from_millis(computation)),
            finalization: Some(Duration::from_millis(finalization)),
        }
    }

    fn record(mode: Mode, m: Measurement) -> ResultRecord {
        let input = InputReference::new("1000", "random1000_in.gol");
        let configuration = match mode {
            Mode::Sequential => ExperimentConfiguration::sequential(input, 250).unwrap(),
            Mode::Parallel => ExperimentConfiguration::parallel(input, 4, 250).unwrap(),
        };
        ResultRecord {
            configuration,
            measurement: m,
        }
    }

    #[test]
    fn test_render_row() {
        assert_eq!(render_row(&measurement(12, 340, 5)), "12.000,340.000,5.000\n");

        let partial = Measurement {
            setup: None,
            computation: Some(Duration::from_micros(1500)),
            finalization: None,
        };
        assert_eq!(render_row(&partial), ",1.500,\n");
    }

    #[test]
    fn test_sink_names() {
        let names = SinkNames::with_prefix("run1_");
        assert_eq!(names.sequential, "run1_cpu_time.csv");
        assert_eq!(names.parallel, "run1_openmp_time.csv");
        assert_eq!(SinkNames::default().sequential, "cpu_time.csv");
    }

    #[test]
    fn test_rows_go_to_mode_sink_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = MeasurementRecorder::create(dir.path(), &SinkNames::default()).unwrap();

        recorder.record(&record(Mode::Sequential, measurement(1, 2, 3))).unwrap();
        recorder.record(&record(Mode::Parallel, measurement(4, 5, 6))).unwrap();
        recorder.record(&record(Mode::Parallel, measurement(7, 8, 9))).unwrap();

        assert_eq!(recorder.rows_written(Mode::Sequential), 1);
        assert_eq!(recorder.rows_written(Mode::Parallel), 2);

        let seq = std::fs::read_to_string(recorder.sink_path(Mode::Sequential)).unwrap();
        assert_eq!(seq, "1.000,2.000,3.000\n");
        let par = std::fs::read_to_string(recorder.sink_path(Mode::Parallel)).unwrap();
        assert_eq!(par, "4.000,5.000,6.000\n7.000,8.000,9.000\n");
    }

    #[test]
    fn test_create_truncates_previous_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let names = SinkNames::default();
        std::fs::write(dir.path().join(&names.sequential), "stale\n").unwrap();
        std::fs::write(dir.path().join(&names.parallel), "stale\n").unwrap();

        let recorder = MeasurementRecorder::create(dir.path(), &names).unwrap();
        for mode in Mode::ALL {
            assert_eq!(std::fs::read_to_string(recorder.sink_path(mode)).unwrap(), "");
        }
    }

    #[test]
    fn test_create_makes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        let recorder = MeasurementRecorder::create(&nested, &SinkNames::default()).unwrap();
        assert!(recorder.sink_path(Mode::Parallel).starts_with(&nested));
        assert!(recorder.sink_path(Mode::Parallel).exists());
    }

    #[test]
    fn test_unwritable_directory_is_sink_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let err = MeasurementRecorder::create(&blocker, &SinkNames::default())
            .err()
            .unwrap();
        assert_eq!(err.path, blocker);
    }
}
