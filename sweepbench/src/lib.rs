#![warn(missing_docs)]
//! # SweepBench
//!
//! Benchmark sweeps for externally built, precompiled workloads.
//!
//! SweepBench runs a workload binary over a matrix of configurations, reads
//! the phase timings it prints, and keeps them in durable per-mode result sinks:
//! - **Size sweeps**: sequential vs parallel across a range of input sizes
//! - **Thread sweeps**: one input, thread counts `1..=N`, optimal count selection
//! - **Fault tolerance**: a failed, unparseable or missing run is logged and skipped
//! - **Append-only sinks**: one row per recorded run, in execution order
//! - **Reports**: human-readable tables or JSON with scaling analysis
//!
//! ## Workload contract
//!
//! ```text
//! <workload> --load <in> --save <out> --generations <N> --measure --mode {seq|omp} [--threads <T>]
//! stdout:  setup: 12ms
//!          computation: 340ms
//!          finalization: 5ms
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use sweepbench::prelude::*;
//!
//! let input = InputReference::from_size(10_000, "inputs".as_ref(), "random{size}_in.gol");
//! let plan = SweepPlan::thread_sweep(&input, 8, 250, BaselinePolicy::Once)?;
//! let recorder = MeasurementRecorder::create("results".as_ref(), &SinkNames::default())?;
//! let mut controller = SweepController::new(
//!     ProcessInvoker,
//!     WorkloadCommand::new("./game_of_life"),
//!     SavePaths::new("results", "{size}_{mode}_out.gol"),
//!     recorder,
//! );
//! let outcome = controller.run(&plan)?;
//! let best = select_optimal(&outcome.candidates(), CostMetric::WallClock)?;
//! println!("optimal thread count: {}", best.thread_count);
//! ```

// Re-export core types
pub use sweepbench_core::{
    ConfigurationError, ExperimentConfiguration, InputReference, InvocationError, Measurement,
    Mode, ParseError, Phase, RawRunResult, ResourceMissingError, ResultRecord, RunError, Trial,
    parse_duration, parse_measurement,
};

// Re-export stats
pub use sweepbench_stats::{
    Candidate, CostMetric, EmptySweepError, ScalingPoint, Selection, scaling_table, select_optimal,
};

// Re-export report types
pub use sweepbench_report::{
    MeasurementRecorder, OutputFormat, SinkNames, SinkWriteError, SweepReport,
    format_human_report, generate_json_report,
};

// Re-export sweep machinery
pub use sweepbench_cli::{
    BaselinePolicy, InvocationSpec, Invoker, ProcessInvoker, RunOutcome, SavePaths, SweepAxis,
    SweepConfig, SweepController, SweepOutcome, SweepPlan, WorkloadCommand,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BaselinePolicy, CostMetric, InputReference, MeasurementRecorder, Mode, ProcessInvoker,
        SavePaths, SinkNames, SweepController, SweepPlan, WorkloadCommand, select_optimal,
    };
}

/// Run the SweepBench CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     sweepbench::run()
/// }
/// ```
pub use sweepbench_cli::run;
