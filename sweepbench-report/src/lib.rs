#![warn(missing_docs)]
//! SweepBench Report - Persistence and Output
//!
//! - Append-only per-mode result sinks (`MeasurementRecorder`)
//! - Sweep report model (serde)
//! - JSON and human-readable renderings

mod human;
mod json;
mod recorder;
mod report;

pub use human::format_human_report;
pub use json::{SCHEMA_VERSION, generate_json_report};
pub use recorder::{FIELD_DELIMITER, MeasurementRecorder, SinkNames, SinkWriteError, render_row};
pub use report::{
    OptimalRow, ReportMeta, ReportSummary, ScalingRow, SkippedRow, SweepReport, SystemInfo,
    TrialRow, millis,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
