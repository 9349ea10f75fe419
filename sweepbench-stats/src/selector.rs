//! Optimal Thread-Count Selection
//!
//! Picks the thread count with the lowest cost among the parallel-mode trials
//! of one sweep. Ties go to the smallest thread count, so the result does not
//! depend on the order trials were collected in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use sweepbench_core::{Measurement, Mode, Phase, Trial};
use thiserror::Error;

/// Which duration a trial is judged by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostMetric {
    /// End-to-end wall clock measured by the harness (falls back to the
    /// computation phase when no wall clock is available)
    #[default]
    WallClock,
    /// Reported setup phase
    Setup,
    /// Reported computation phase
    Computation,
    /// Reported finalization phase
    Finalization,
    /// Sum of all reported phases
    PhaseTotal,
}

impl CostMetric {
    /// Cost of one run under this metric, if the run has that dimension
    pub fn cost(self, measurement: &Measurement, wall_clock: Option<Duration>) -> Option<Duration> {
        match self {
            CostMetric::WallClock => wall_clock.or(measurement.computation),
            CostMetric::Setup => measurement.phase(Phase::Setup),
            CostMetric::Computation => measurement.phase(Phase::Computation),
            CostMetric::Finalization => measurement.phase(Phase::Finalization),
            CostMetric::PhaseTotal => measurement.phase_total(),
        }
    }

    /// Kebab-case name, as accepted by [`str::parse`]
    pub fn name(self) -> &'static str {
        match self {
            CostMetric::WallClock => "wall-clock",
            CostMetric::Setup => "setup",
            CostMetric::Computation => "computation",
            CostMetric::Finalization => "finalization",
            CostMetric::PhaseTotal => "phase-total",
        }
    }
}

impl fmt::Display for CostMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for CostMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wall-clock" | "wall" | "wallclock" => Ok(CostMetric::WallClock),
            "setup" => Ok(CostMetric::Setup),
            "computation" | "compute" => Ok(CostMetric::Computation),
            "finalization" => Ok(CostMetric::Finalization),
            "phase-total" | "total" => Ok(CostMetric::PhaseTotal),
            other => Err(format!("Unknown cost metric: {}", other)),
        }
    }
}

/// One parallel-mode observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Thread count the run used
    pub thread_count: u32,
    /// Phase timings the workload reported
    pub measurement: Measurement,
    /// Harness-measured wall clock, if known
    pub wall_clock: Option<Duration>,
}

impl Candidate {
    /// Candidate from a recorded trial; `None` for sequential trials
    pub fn from_trial(trial: &Trial) -> Option<Self> {
        let configuration = &trial.record.configuration;
        if configuration.mode() != Mode::Parallel {
            return None;
        }
        Some(Self {
            thread_count: configuration.thread_count()?,
            measurement: trial.record.measurement,
            wall_clock: Some(trial.wall_clock),
        })
    }

    /// Cost under `metric`
    pub fn cost(&self, metric: CostMetric) -> Option<Duration> {
        metric.cost(&self.measurement, self.wall_clock)
    }
}

/// Result of [`select_optimal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Winning thread count
    pub thread_count: u32,
    /// Its cost
    pub cost: Duration,
    /// Metric the cost was measured in
    pub metric: CostMetric,
    /// Candidates that had a cost under the metric
    pub candidates_considered: usize,
}

/// No parallel-mode candidate had a cost under the requested metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no parallel-mode measurements with a {metric} cost were collected")]
pub struct EmptySweepError {
    /// Metric that was requested
    pub metric: CostMetric,
}

/// Return the thread count minimising `metric` over `candidates`.
///
/// Candidates without a cost under `metric` are ignored. Among equal costs the
/// smallest thread count wins.
pub fn select_optimal(
    candidates: &[Candidate],
    metric: CostMetric,
) -> Result<Selection, EmptySweepError> {
    let mut best: Option<(u32, Duration)> = None;
    let mut considered = 0usize;

    for candidate in candidates {
        let Some(cost) = candidate.cost(metric) else {
            continue;
        };
        considered += 1;

        let better = match best {
            None => true,
            Some((best_threads, best_cost)) => {
                cost < best_cost || (cost == best_cost && candidate.thread_count < best_threads)
            }
        };
        if better {
            best = Some((candidate.thread_count, cost));
        }
    }

    let (thread_count, cost) = best.ok_or(EmptySweepError { metric })?;
    Ok(Selection {
        thread_count,
        cost,
        metric,
        candidates_considered: considered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepbench_core::{ExperimentConfiguration, InputReference, ResultRecord};

    fn candidate(threads: u32, wall_ms: u64) -> Candidate {
        Candidate {
            thread_count: threads,
            measurement: Measurement {
                setup: Some(Duration::from_millis(10)),
                computation: Some(Duration::from_millis(wall_ms / 2)),
                finalization: None,
            },
            wall_clock: Some(Duration::from_millis(wall_ms)),
        }
    }

    #[test]
    fn test_selects_minimum() {
        let candidates: Vec<_> = [(1, 800), (2, 420), (3, 300), (4, 260), (5, 270)]
            .into_iter()
            .map(|(t, ms)| candidate(t, ms))
            .collect();

        let selection = select_optimal(&candidates, CostMetric::WallClock).unwrap();
        assert_eq!(selection.thread_count, 4);
        assert_eq!(selection.cost, Duration::from_millis(260));
        assert_eq!(selection.candidates_considered, 5);

        // Every candidate costs at least as much as the winner
        for c in &candidates {
            assert!(c.cost(CostMetric::WallClock).unwrap() >= selection.cost);
        }
    }

    #[test]
    fn test_tie_breaks_to_smallest_thread_count() {
        let candidates = vec![candidate(8, 200), candidate(3, 200), candidate(5, 200), candidate(1, 900)];
        let selection = select_optimal(&candidates, CostMetric::WallClock).unwrap();
        assert_eq!(selection.thread_count, 3);
    }

    #[test]
    fn test_empty_sweep() {
        assert_eq!(
            select_optimal(&[], CostMetric::WallClock),
            Err(EmptySweepError {
                metric: CostMetric::WallClock
            })
        );

        // No candidate reports a finalization phase
        let candidates = vec![candidate(1, 100)];
        assert!(select_optimal(&candidates, CostMetric::Finalization).is_err());
    }

    #[test]
    fn test_wall_clock_falls_back_to_computation() {
        let mut a = candidate(1, 1000);
        a.wall_clock = None;
        let mut b = candidate(2, 600);
        b.wall_clock = None;

        let selection = select_optimal(&[a, b], CostMetric::WallClock).unwrap();
        assert_eq!(selection.thread_count, 2);
        assert_eq!(selection.cost, Duration::from_millis(300));
    }

    #[test]
    fn test_phase_metrics() {
        let candidates = vec![candidate(1, 400), candidate(2, 200)];
        let selection = select_optimal(&candidates, CostMetric::PhaseTotal).unwrap();
        assert_eq!(selection.thread_count, 2);
        assert_eq!(selection.cost, Duration::from_millis(110));

        // Setup is identical everywhere: lowest thread count wins
        let selection = select_optimal(&candidates, CostMetric::Setup).unwrap();
        assert_eq!(selection.thread_count, 1);
    }

    #[test]
    fn test_candidate_from_trial_skips_sequential() {
        let input = InputReference::new("10000", "random10000_in.gol");
        let seq = Trial {
            record: ResultRecord {
                configuration: ExperimentConfiguration::sequential(input.clone(), 250).unwrap(),
                measurement: Measurement::default(),
            },
            wall_clock: Duration::from_secs(1),
        };
        assert!(Candidate::from_trial(&seq).is_none());

        let par = Trial {
            record: ResultRecord {
                configuration: ExperimentConfiguration::parallel(input, 6, 250).unwrap(),
                measurement: Measurement::default(),
            },
            wall_clock: Duration::from_secs(1),
        };
        let candidate = Candidate::from_trial(&par).unwrap();
        assert_eq!(candidate.thread_count, 6);
        assert_eq!(candidate.wall_clock, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_metric_parse_and_serde() {
        assert_eq!("wall-clock".parse::<CostMetric>(), Ok(CostMetric::WallClock));
        assert_eq!("Computation".parse::<CostMetric>(), Ok(CostMetric::Computation));
        assert!("latency".parse::<CostMetric>().is_err());

        let json = serde_json::to_string(&CostMetric::PhaseTotal).unwrap();
        assert_eq!(json, "\"phase-total\"");
        for metric in [
            CostMetric::WallClock,
            CostMetric::Setup,
            CostMetric::Computation,
            CostMetric::Finalization,
            CostMetric::PhaseTotal,
        ] {
            assert_eq!(metric.name().parse::<CostMetric>(), Ok(metric));
        }
    }
}
