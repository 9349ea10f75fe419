//! Report Building
//!
//! Turns a finished [`SweepOutcome`] into a [`SweepReport`]:
//!
//! ```text
//! SweepOutcome ──▶ TrialRow / SkippedRow
//!      │
//!      ├── thread sweep only ──▶ select_optimal ──▶ OptimalRow
//!      │                    └──▶ scaling_table  ──▶ ScalingRow
//!      ▼
//!  SweepReport (JSON / human)
//! ```

use crate::controller::SweepOutcome;
use crate::planner::SweepAxis;
use sweepbench_core::Mode;
use sweepbench_report::{
    OptimalRow, ReportMeta, ReportSummary, ScalingRow, SkippedRow, SweepReport, TrialRow, millis,
};
use sweepbench_stats::{CostMetric, EmptySweepError, Selection, scaling_table, select_optimal};

/// Optimal thread count and scaling of a thread sweep
#[derive(Debug, Clone)]
pub struct ThreadAnalysis {
    /// Selector result
    pub selection: Selection,
    /// Scaling against the sequential baseline; empty when there is no baseline
    pub scaling: Vec<ScalingRow>,
}

/// Run the selector over the parallel trials of `outcome`.
///
/// Fails when no parallel run was recorded with a cost under `metric`.
pub fn analyze_threads(
    outcome: &SweepOutcome,
    metric: CostMetric,
) -> Result<ThreadAnalysis, EmptySweepError> {
    let candidates = outcome.candidates();
    let selection = select_optimal(&candidates, metric)?;
    let scaling = match outcome.sequential_baseline(metric) {
        Some(baseline) => scaling_table(baseline, &candidates, metric)
            .iter()
            .map(ScalingRow::from)
            .collect(),
        None => {
            tracing::debug!(%metric, "no sequential baseline, scaling table omitted");
            Vec::new()
        }
    };
    Ok(ThreadAnalysis { selection, scaling })
}

/// Assemble the report for `outcome`
pub fn build_report(
    outcome: &SweepOutcome,
    analysis: Option<&ThreadAnalysis>,
    meta: ReportMeta,
) -> SweepReport {
    debug_assert!(analysis.is_none() || outcome.axis == SweepAxis::Threads);

    let summary = ReportSummary {
        planned: outcome.planned,
        recorded: outcome.trials.len(),
        sequential_rows: outcome.count(Mode::Sequential),
        parallel_rows: outcome.count(Mode::Parallel),
        skipped: outcome.skipped.len(),
        total_duration_ms: millis(outcome.elapsed),
    };

    SweepReport {
        meta,
        trials: outcome.trials.iter().map(TrialRow::from).collect(),
        skipped: outcome.skipped.iter().map(SkippedRow::from).collect(),
        optimal: analysis.map(|a| OptimalRow::from(&a.selection)),
        scaling: analysis.map(|a| a.scaling.clone()).unwrap_or_default(),
        summary,
    }
}
