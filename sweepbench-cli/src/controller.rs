//! Sweep Controller
//!
//! Executes a [`SweepPlan`] one configuration at a time and owns the
//! continue-vs-abort decision.
//!
//! ## Per-configuration pipeline
//!
//! ```text
//! ExperimentConfiguration
//!        │
//!        ▼
//!  input exists? ──no──▶ ResourceMissingError ─┐
//!        │                                     │
//!        ▼                                     │
//!   Invoker::invoke ──fail / exit≠0──▶ InvocationError ─┤  logged, skipped,
//!        │                                     │  sweep continues
//!        ▼                                     │
//!  parse_measurement ──no labels──▶ ParseError ─┘
//!        │
//!        ▼
//! MeasurementRecorder::record ──io error──▶ SinkWriteError (sweep aborts)
//! ```
//!
//! Runs never overlap: each configuration, including its sink write, finishes
//! before the next one starts.

use crate::invoker::{InvocationSpec, Invoker, WorkloadCommand};
use crate::planner::{SweepAxis, SweepPlan};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sweepbench_core::{
    ExperimentConfiguration, InvocationError, MODE_PLACEHOLDER, Measurement, Mode,
    ResourceMissingError, ResultRecord, RunError, SIZE_PLACEHOLDER, THREADS_PLACEHOLDER, Trial,
    parse_measurement,
};
use sweepbench_report::{MeasurementRecorder, SinkWriteError};
use sweepbench_stats::{Candidate, CostMetric};

/// Where the workload writes its output artifact for each configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePaths {
    directory: PathBuf,
    pattern: String,
}

impl SavePaths {
    /// Artifacts go to `directory`, named by `pattern`
    pub fn new(directory: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            pattern: pattern.into(),
        }
    }

    /// Directory artifacts are written to
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Artifact path for one configuration
    pub fn for_configuration(&self, configuration: &ExperimentConfiguration) -> PathBuf {
        let threads = configuration
            .thread_count()
            .map(|t| t.to_string())
            .unwrap_or_else(|| Mode::Sequential.cli_name().to_string());
        let file_name = self
            .pattern
            .replace(SIZE_PLACEHOLDER, configuration.input().label())
            .replace(MODE_PLACEHOLDER, configuration.mode().artifact_label())
            .replace(THREADS_PLACEHOLDER, &threads);
        self.directory.join(file_name)
    }
}

/// What happened to one planned configuration
#[derive(Debug)]
pub enum RunOutcome {
    /// Measured and appended to its sink
    Recorded(Trial),
    /// No record; the reason was logged
    Skipped(RunError),
}

/// Everything a finished sweep produced
#[derive(Debug)]
pub struct SweepOutcome {
    /// Axis of the executed plan
    pub axis: SweepAxis,
    /// Number of planned configurations
    pub planned: usize,
    /// Recorded runs in execution order
    pub trials: Vec<Trial>,
    /// Runs that produced no record, in execution order
    pub skipped: Vec<RunError>,
    /// Wall-clock time of the whole sweep
    pub elapsed: Duration,
}

impl SweepOutcome {
    /// Recorded runs in `mode`
    pub fn count(&self, mode: Mode) -> usize {
        self.trials
            .iter()
            .filter(|t| t.record.configuration.mode() == mode)
            .count()
    }

    /// Parallel-mode trials as selector candidates, in execution order
    pub fn candidates(&self) -> Vec<Candidate> {
        self.trials.iter().filter_map(Candidate::from_trial).collect()
    }

    /// Cost of the first recorded sequential run under `metric`
    pub fn sequential_baseline(&self, metric: CostMetric) -> Option<Duration> {
        self.trials
            .iter()
            .find(|t| t.record.configuration.mode() == Mode::Sequential)
            .and_then(|t| metric.cost(&t.record.measurement, Some(t.wall_clock)))
    }
}

/// Drives invoker, parser and recorder over a plan
pub struct SweepController<I: Invoker> {
    invoker: I,
    workload: WorkloadCommand,
    save_paths: SavePaths,
    recorder: MeasurementRecorder,
    show_progress: bool,
}

impl<I: Invoker> SweepController<I> {
    /// Controller writing into a freshly created `recorder`
    pub fn new(
        invoker: I,
        workload: WorkloadCommand,
        save_paths: SavePaths,
        recorder: MeasurementRecorder,
    ) -> Self {
        Self {
            invoker,
            workload,
            save_paths,
            recorder,
            show_progress: false,
        }
    }

    /// Draw a progress bar while the sweep runs
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The recorder owning this sweep's sinks
    pub fn recorder(&self) -> &MeasurementRecorder {
        &self.recorder
    }

    /// Run one configuration and parse its report, without recording.
    ///
    /// Yields exactly one of: a measurement (with the harness wall clock), an
    /// invocation failure, a parse failure, or a missing input.
    pub fn measure(
        &mut self,
        configuration: &ExperimentConfiguration,
    ) -> Result<(Measurement, Duration), RunError> {
        let save_path = self.save_paths.for_configuration(configuration);
        let spec = InvocationSpec::build(&self.workload, configuration, &save_path);
        if !spec.load_path().exists() {
            return Err(ResourceMissingError {
                path: spec.load_path().to_path_buf(),
                configuration: configuration.clone(),
            }
            .into());
        }

        let raw = self.invoker.invoke(&spec)?;

        if !raw.exit_success {
            return Err(InvocationError::ExitFailure {
                configuration: configuration.clone(),
                exit_code: raw.exit_code,
                stderr: raw.stderr,
            }
            .into());
        }

        let measurement = parse_measurement(&raw.stdout)
            .map_err(|e| e.with_configuration(configuration.clone()))?;
        Ok((measurement, raw.wall_clock))
    }

    /// Run one configuration and record it. Only a sink failure is an error.
    pub fn run_one(
        &mut self,
        configuration: &ExperimentConfiguration,
    ) -> Result<RunOutcome, SinkWriteError> {
        match self.measure(configuration) {
            Ok((measurement, wall_clock)) => {
                let record = ResultRecord {
                    configuration: configuration.clone(),
                    measurement,
                };
                self.recorder.record(&record)?;
                tracing::info!(
                    mode = %configuration.mode(),
                    threads = ?configuration.thread_count(),
                    input = configuration.input().label(),
                    wall_clock_ms = wall_clock.as_secs_f64() * 1_000.0,
                    "recorded"
                );
                Ok(RunOutcome::Recorded(Trial { record, wall_clock }))
            }
            Err(error) => {
                log_skip(configuration, &error);
                Ok(RunOutcome::Skipped(error))
            }
        }
    }

    /// Execute every planned configuration in order.
    ///
    /// Failures of individual runs are logged and skipped; a sink write
    /// failure stops the sweep and is returned.
    pub fn run(&mut self, plan: &SweepPlan) -> Result<SweepOutcome, SinkWriteError> {
        let start = Instant::now();
        let pb = if self.show_progress {
            let pb = ProgressBar::new(plan.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        tracing::info!(axis = %plan.axis(), runs = plan.len(), "starting sweep");

        let mut trials = Vec::new();
        let mut skipped = Vec::new();
        for configuration in plan.entries() {
            pb.set_message(configuration.to_string());
            match self.run_one(configuration) {
                Ok(RunOutcome::Recorded(trial)) => trials.push(trial),
                Ok(RunOutcome::Skipped(error)) => skipped.push(error),
                Err(e) => {
                    pb.abandon_with_message("aborted: result sink unwritable");
                    tracing::error!(path = %e.path.display(), error = %e.source, "aborting sweep");
                    return Err(e);
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("Complete");

        let outcome = SweepOutcome {
            axis: plan.axis(),
            planned: plan.len(),
            trials,
            skipped,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            recorded = outcome.trials.len(),
            skipped = outcome.skipped.len(),
            elapsed_s = outcome.elapsed.as_secs_f64(),
            "sweep finished"
        );
        Ok(outcome)
    }
}

fn log_skip(configuration: &ExperimentConfiguration, error: &RunError) {
    match error {
        RunError::ResourceMissing(e) => tracing::warn!(
            mode = %configuration.mode(),
            threads = ?configuration.thread_count(),
            input = configuration.input().label(),
            path = %e.path.display(),
            "input file does not exist, skipping"
        ),
        RunError::Invocation(e) => tracing::warn!(
            mode = %configuration.mode(),
            threads = ?configuration.thread_count(),
            input = configuration.input().label(),
            generations = configuration.generations(),
            stderr = %e.message(),
            "workload run failed"
        ),
        RunError::Parse(e) => tracing::warn!(
            mode = %configuration.mode(),
            threads = ?configuration.thread_count(),
            input = configuration.input().label(),
            generations = configuration.generations(),
            stdout_bytes = e.raw.len(),
            "workload output had no timing report"
        ),
    }
}
