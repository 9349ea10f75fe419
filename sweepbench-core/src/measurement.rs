//! Measurements and Records

use crate::experiment::ExperimentConfiguration;
use std::fmt;
use std::time::Duration;

/// One self-reported phase of a workload run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Loading the input grid
    Setup,
    /// Simulating the generations
    Computation,
    /// Writing the output grid
    Finalization,
}

impl Phase {
    /// All phases, in report and sink column order
    pub const ALL: [Phase; 3] = [Phase::Setup, Phase::Computation, Phase::Finalization];

    /// Label used by the workload's timing report
    pub fn label(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Computation => "computation",
            Phase::Finalization => "finalization",
        }
    }

    /// Case-insensitive lookup of a report label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Phase timings reported by the workload. Each phase is optional because the
/// report may omit any of its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    /// Setup phase duration
    pub setup: Option<Duration>,
    /// Computation phase duration
    pub computation: Option<Duration>,
    /// Finalization phase duration
    pub finalization: Option<Duration>,
}

impl Measurement {
    /// Duration of one phase, if reported
    pub fn phase(&self, phase: Phase) -> Option<Duration> {
        match phase {
            Phase::Setup => self.setup,
            Phase::Computation => self.computation,
            Phase::Finalization => self.finalization,
        }
    }

    pub(crate) fn set_phase(&mut self, phase: Phase, value: Duration) {
        match phase {
            Phase::Setup => self.setup = Some(value),
            Phase::Computation => self.computation = Some(value),
            Phase::Finalization => self.finalization = Some(value),
        }
    }

    /// The three phases in column order
    pub fn fields(&self) -> [Option<Duration>; 3] {
        [self.setup, self.computation, self.finalization]
    }

    /// Whether no phase was reported
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(Option::is_none)
    }

    /// Sum of the reported phases; `None` if no phase was reported
    pub fn phase_total(&self) -> Option<Duration> {
        self.fields()
            .into_iter()
            .flatten()
            .reduce(|acc, d| acc + d)
    }
}

/// A measurement bound to the configuration that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// Configuration that was run
    pub configuration: ExperimentConfiguration,
    /// Phase timings it reported
    pub measurement: Measurement,
}

/// A recorded run together with the harness-side wall-clock time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    /// What was written to the sink
    pub record: ResultRecord,
    /// End-to-end time measured around the process invocation
    pub wall_clock: Duration,
}
