//! Scaling Analysis
//!
//! Speedup and parallel efficiency of each thread count relative to the
//! sequential baseline: `speedup = baseline / cost`, `efficiency = speedup / threads`.

use crate::selector::{Candidate, CostMetric};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One row of a scaling table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingPoint {
    /// Thread count of the parallel run
    pub thread_count: u32,
    /// Its cost under the table's metric
    pub cost: Duration,
    /// Baseline cost divided by this cost (`None` for a zero cost)
    pub speedup: Option<f64>,
    /// Speedup per thread
    pub efficiency: Option<f64>,
}

/// Build the scaling table of `candidates` against `baseline`, in candidate order.
///
/// Candidates without a cost under `metric` are left out.
pub fn scaling_table(
    baseline: Duration,
    candidates: &[Candidate],
    metric: CostMetric,
) -> Vec<ScalingPoint> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let cost = candidate.cost(metric)?;
            let speedup = if cost.is_zero() {
                None
            } else {
                Some(baseline.as_secs_f64() / cost.as_secs_f64())
            };
            Some(ScalingPoint {
                thread_count: candidate.thread_count,
                cost,
                speedup,
                efficiency: speedup.map(|s| s / f64::from(candidate.thread_count)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepbench_core::Measurement;

    fn candidate(threads: u32, wall_ms: u64) -> Candidate {
        Candidate {
            thread_count: threads,
            measurement: Measurement::default(),
            wall_clock: Some(Duration::from_millis(wall_ms)),
        }
    }

    #[test]
    fn test_speedup_and_efficiency() {
        let candidates = vec![candidate(1, 1000), candidate(2, 500), candidate(4, 400)];
        let table = scaling_table(Duration::from_millis(1000), &candidates, CostMetric::WallClock);

        assert_eq!(table.len(), 3);
        assert!((table[0].speedup.unwrap() - 1.0).abs() < 1e-9);
        assert!((table[1].speedup.unwrap() - 2.0).abs() < 1e-9);
        assert!((table[1].efficiency.unwrap() - 1.0).abs() < 1e-9);
        assert!((table[2].speedup.unwrap() - 2.5).abs() < 1e-9);
        assert!((table[2].efficiency.unwrap() - 0.625).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cost_and_missing_metric() {
        let candidates = vec![candidate(2, 0)];
        let table = scaling_table(Duration::from_millis(10), &candidates, CostMetric::WallClock);
        assert_eq!(table[0].speedup, None);
        assert_eq!(table[0].efficiency, None);

        let table = scaling_table(Duration::from_millis(10), &candidates, CostMetric::Setup);
        assert!(table.is_empty());
    }
}
