#![warn(missing_docs)]
//! SweepBench Core - Experiment Model
//!
//! This crate holds everything a sweep needs to describe and interpret one run
//! of the external workload:
//! - `ExperimentConfiguration` and `Mode` (what to run)
//! - `RawRunResult` (what the process produced)
//! - `Measurement` and the timing-report parser (what the workload reported)
//! - The error taxonomy shared by the planner, invoker and controller

mod duration;
mod error;
mod experiment;
mod measurement;
mod parser;

pub use duration::{DurationParseError, format_duration, format_millis, parse_duration};
pub use error::{ConfigurationError, InvocationError, ParseError, ResourceMissingError, RunError};
pub use experiment::{ExperimentConfiguration, InputReference, Mode, RawRunResult};
pub use measurement::{Measurement, Phase, ResultRecord, Trial};
pub use parser::parse_measurement;

/// Placeholder substituted with the input size in input and artifact file patterns
pub const SIZE_PLACEHOLDER: &str = "{size}";

/// Placeholder substituted with the mode's artifact label (`cpu` / `openmp`)
pub const MODE_PLACEHOLDER: &str = "{mode}";

/// Placeholder substituted with the thread count (`seq` for sequential runs)
pub const THREADS_PLACEHOLDER: &str = "{threads}";
