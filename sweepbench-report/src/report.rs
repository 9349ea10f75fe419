//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use sweepbench_core::{Mode, RunError, Trial};
use sweepbench_stats::{CostMetric, ScalingPoint, Selection};

/// Complete sweep report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub meta: ReportMeta,
    pub trials: Vec<TrialRow>,
    pub skipped: Vec<SkippedRow>,
    pub optimal: Option<OptimalRow>,
    pub scaling: Vec<ScalingRow>,
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    /// Which axis the sweep varied: "sizes", "threads" or "compare"
    pub axis: String,
    pub workload: String,
    pub generations: u32,
    pub system: SystemInfo,
}

/// Host the sweep ran on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu: String,
    pub cpu_cores: u32,
}

/// One recorded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRow {
    pub mode: Mode,
    pub threads: Option<u32>,
    pub input: String,
    pub setup_ms: Option<f64>,
    pub computation_ms: Option<f64>,
    pub finalization_ms: Option<f64>,
    pub wall_clock_ms: f64,
}

impl From<&Trial> for TrialRow {
    fn from(trial: &Trial) -> Self {
        let configuration = &trial.record.configuration;
        let measurement = &trial.record.measurement;
        Self {
            mode: configuration.mode(),
            threads: configuration.thread_count(),
            input: configuration.input().label().to_string(),
            setup_ms: measurement.setup.map(millis),
            computation_ms: measurement.computation.map(millis),
            finalization_ms: measurement.finalization.map(millis),
            wall_clock_ms: millis(trial.wall_clock),
        }
    }
}

/// One planned run that produced no record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub kind: String,
    pub mode: Option<Mode>,
    pub threads: Option<u32>,
    pub input: Option<String>,
    pub message: String,
}

impl From<&RunError> for SkippedRow {
    fn from(error: &RunError) -> Self {
        let configuration = error.configuration();
        let message = match error {
            RunError::Invocation(e) => e.message(),
            other => other.to_string(),
        };
        Self {
            kind: error.kind().to_string(),
            mode: configuration.map(|c| c.mode()),
            threads: configuration.and_then(|c| c.thread_count()),
            input: configuration.map(|c| c.input().label().to_string()),
            message,
        }
    }
}

/// Optimal thread count of a thread sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalRow {
    pub thread_count: u32,
    pub cost_ms: f64,
    pub metric: CostMetric,
    pub candidates: usize,
}

impl From<&Selection> for OptimalRow {
    fn from(selection: &Selection) -> Self {
        Self {
            thread_count: selection.thread_count,
            cost_ms: millis(selection.cost),
            metric: selection.metric,
            candidates: selection.candidates_considered,
        }
    }
}

/// One scaling-table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRow {
    pub thread_count: u32,
    pub cost_ms: f64,
    pub speedup: Option<f64>,
    pub efficiency: Option<f64>,
}

impl From<&ScalingPoint> for ScalingRow {
    fn from(point: &ScalingPoint) -> Self {
        Self {
            thread_count: point.thread_count,
            cost_ms: millis(point.cost),
            speedup: point.speedup,
            efficiency: point.efficiency,
        }
    }
}

/// Report summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub planned: usize,
    pub recorded: usize,
    pub sequential_rows: usize,
    pub parallel_rows: usize,
    pub skipped: usize,
    pub total_duration_ms: f64,
}

/// Duration as fractional milliseconds
pub fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use sweepbench_core::{
        ExperimentConfiguration, InputReference, InvocationError, Measurement,
        ResourceMissingError, ResultRecord,
    };

    fn configuration() -> ExperimentConfiguration {
        ExperimentConfiguration::parallel(InputReference::new("7000", "random7000_in.gol"), 3, 250)
            .unwrap()
    }

    #[test]
    fn test_trial_row() {
        let trial = Trial {
            record: ResultRecord {
                configuration: configuration(),
                measurement: Measurement {
                    setup: Some(Duration::from_millis(12)),
                    computation: None,
                    finalization: Some(Duration::from_micros(500)),
                },
            },
            wall_clock: Duration::from_millis(400),
        };
        let row = TrialRow::from(&trial);
        assert_eq!(row.mode, Mode::Parallel);
        assert_eq!(row.threads, Some(3));
        assert_eq!(row.input, "7000");
        assert_eq!(row.setup_ms, Some(12.0));
        assert_eq!(row.computation_ms, None);
        assert_eq!(row.finalization_ms, Some(0.5));
        assert_eq!(row.wall_clock_ms, 400.0);
    }

    #[test]
    fn test_skipped_row_uses_stderr_for_invocation_failures() {
        let error = RunError::from(InvocationError::ExitFailure {
            configuration: configuration(),
            exit_code: Some(1),
            stderr: "file not found\n".to_string(),
        });
        let row = SkippedRow::from(&error);
        assert_eq!(row.kind, "invocation");
        assert_eq!(row.message, "file not found");
        assert_eq!(row.threads, Some(3));

        let error = RunError::from(ResourceMissingError {
            path: PathBuf::from("random7000_in.gol"),
            configuration: configuration(),
        });
        let row = SkippedRow::from(&error);
        assert_eq!(row.kind, "resource-missing");
        assert_eq!(row.input.as_deref(), Some("7000"));
    }
}
