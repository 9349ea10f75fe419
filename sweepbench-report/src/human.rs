//! Human-Readable Output
//!
//! Terminal-friendly rendering of a sweep report:
//! - Recorded runs grouped by input, with phase timings and wall clock
//! - Skipped runs with their reason
//! - Optimal thread count and scaling table for thread sweeps

use crate::report::{SweepReport, TrialRow};

fn ms(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn mode_label(row: &TrialRow) -> String {
    match row.threads {
        Some(t) => format!("{} x{}", row.mode, t),
        None => row.mode.to_string(),
    }
}

/// Format a report for terminal display
pub fn format_human_report(report: &SweepReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!(
        "SweepBench Results ({} sweep, {} generations)\n",
        report.meta.axis, report.meta.generations
    ));
    output.push_str(&"=".repeat(72));
    output.push_str("\n\n");

    // Group by input in first-seen order; "10000" must not sort before "2000"
    let mut groups: Vec<(&str, Vec<&TrialRow>)> = Vec::new();
    for row in &report.trials {
        match groups.iter_mut().find(|(input, _)| *input == row.input) {
            Some((_, rows)) => rows.push(row),
            None => groups.push((&row.input, vec![row])),
        }
    }

    for (input, rows) in groups {
        output.push_str(&format!("Input: {}\n", input));
        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "  {:<10}  {:>12}  {:>14}  {:>14}  {:>12}\n",
            "mode", "setup ms", "computation ms", "finalize ms", "wall ms"
        ));
        for row in rows {
            output.push_str(&format!(
                "  {:<10}  {:>12}  {:>14}  {:>14}  {:>12.3}\n",
                mode_label(row),
                ms(row.setup_ms),
                ms(row.computation_ms),
                ms(row.finalization_ms),
                row.wall_clock_ms
            ));
        }
        output.push('\n');
    }

    if !report.skipped.is_empty() {
        output.push_str("Skipped\n");
        output.push_str(&"-".repeat(72));
        output.push('\n');
        for skipped in &report.skipped {
            let target = match (&skipped.input, skipped.mode, skipped.threads) {
                (Some(input), Some(mode), Some(t)) => format!("{} {} x{}", input, mode, t),
                (Some(input), Some(mode), None) => format!("{} {}", input, mode),
                _ => "?".to_string(),
            };
            output.push_str(&format!(
                "  ⊘ {} [{}]: {}\n",
                target, skipped.kind, skipped.message
            ));
        }
        output.push('\n');
    }

    if !report.scaling.is_empty() {
        output.push_str("Scaling vs sequential baseline\n");
        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "  {:>7}  {:>12}  {:>9}  {:>10}\n",
            "threads", "cost ms", "speedup", "efficiency"
        ));
        for point in &report.scaling {
            let speedup = point
                .speedup
                .map(|s| format!("{:.2}x", s))
                .unwrap_or_else(|| "-".to_string());
            let efficiency = point
                .efficiency
                .map(|e| format!("{:.0}%", e * 100.0))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "  {:>7}  {:>12.3}  {:>9}  {:>10}\n",
                point.thread_count, point.cost_ms, speedup, efficiency
            ));
        }
        output.push('\n');
    }

    if let Some(optimal) = &report.optimal {
        output.push_str(&format!(
            "Optimal thread count: {} ({} {:.3} ms over {} candidates)\n",
            optimal.thread_count, optimal.metric, optimal.cost_ms, optimal.candidates
        ));
    }

    let s = &report.summary;
    output.push_str(&format!(
        "Summary: {} planned, {} recorded ({} seq / {} omp rows), {} skipped in {:.1}s\n",
        s.planned,
        s.recorded,
        s.sequential_rows,
        s.parallel_rows,
        s.skipped,
        s.total_duration_ms / 1_000.0
    ));

    output
}
