//! Sweep Planner
//!
//! Builds the ordered list of configurations a sweep executes. The three sweep
//! shapes share one `SweepPlan` type and differ only in which axis varies:
//!
//! - **sizes**: per input, one sequential then one parallel run at a fixed thread count
//! - **threads**: one sequential baseline, then parallel runs for 1..=max threads
//! - **compare**: one input, one sequential and one parallel run
//!
//! Plans are built completely before the first run and never change afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use sweepbench_core::{ConfigurationError, ExperimentConfiguration, InputReference, Mode};

/// How often the sequential baseline is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BaselinePolicy {
    /// Once for every input
    PerInput,
    /// Once per sweep, on the first input present when the plan is built
    Once,
    /// Never
    Skip,
}

/// The axis a plan varies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepAxis {
    /// Input size varies, thread count fixed
    Sizes,
    /// Thread count varies, input fixed
    Threads,
    /// Nothing varies: sequential vs parallel on one input
    Compare,
}

impl SweepAxis {
    /// Name used in reports and logs
    pub fn name(self) -> &'static str {
        match self {
            SweepAxis::Sizes => "sizes",
            SweepAxis::Threads => "threads",
            SweepAxis::Compare => "compare",
        }
    }
}

impl fmt::Display for SweepAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered, read-only list of configurations for one sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    axis: SweepAxis,
    entries: Vec<ExperimentConfiguration>,
}

impl SweepPlan {
    /// Size sweep: per input, sequential (subject to `baseline`) then parallel at `threads`.
    ///
    /// With [`BaselinePolicy::Once`] the baseline goes to the first input that
    /// exists, falling back to the first input when none do.
    pub fn size_sweep(
        inputs: &[InputReference],
        threads: u32,
        generations: u32,
        baseline: BaselinePolicy,
    ) -> Result<Self, ConfigurationError> {
        let once_at = inputs.iter().position(InputReference::exists).unwrap_or(0);
        let mut entries = Vec::with_capacity(inputs.len() * 2);
        for (i, input) in inputs.iter().enumerate() {
            let with_baseline = match baseline {
                BaselinePolicy::PerInput => true,
                BaselinePolicy::Once => i == once_at,
                BaselinePolicy::Skip => false,
            };
            if with_baseline {
                entries.push(ExperimentConfiguration::sequential(input.clone(), generations)?);
            }
            entries.push(ExperimentConfiguration::parallel(
                input.clone(),
                threads,
                generations,
            )?);
        }
        Ok(Self {
            axis: SweepAxis::Sizes,
            entries,
        })
    }

    /// Thread sweep: sequential baseline (unless skipped), then parallel for `1..=max_threads`.
    pub fn thread_sweep(
        input: &InputReference,
        max_threads: u32,
        generations: u32,
        baseline: BaselinePolicy,
    ) -> Result<Self, ConfigurationError> {
        if max_threads == 0 {
            return Err(ConfigurationError::ZeroThreads);
        }
        let mut entries = Vec::with_capacity(max_threads as usize + 1);
        if baseline != BaselinePolicy::Skip {
            entries.push(ExperimentConfiguration::sequential(input.clone(), generations)?);
        }
        for threads in 1..=max_threads {
            entries.push(ExperimentConfiguration::parallel(
                input.clone(),
                threads,
                generations,
            )?);
        }
        Ok(Self {
            axis: SweepAxis::Threads,
            entries,
        })
    }

    /// Fixed-size comparison: one sequential and one parallel run on `input`.
    pub fn comparison(
        input: &InputReference,
        threads: u32,
        generations: u32,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            axis: SweepAxis::Compare,
            entries: vec![
                ExperimentConfiguration::sequential(input.clone(), generations)?,
                ExperimentConfiguration::parallel(input.clone(), threads, generations)?,
            ],
        })
    }

    /// Axis this plan varies
    pub fn axis(&self) -> SweepAxis {
        self.axis
    }

    /// Planned configurations in execution order
    pub fn entries(&self) -> &[ExperimentConfiguration] {
        &self.entries
    }

    /// Number of planned runs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan has no runs
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of planned runs in `mode`
    pub fn count(&self, mode: Mode) -> usize {
        self.entries.iter().filter(|c| c.mode() == mode).count()
    }

    /// Tree rendering for dry runs
    pub fn describe(&self) -> String {
        let mut out = format!("SweepBench Plan ({} sweep):\n", self.axis);
        let mut current_input: Option<&str> = None;
        for cfg in &self.entries {
            let label = cfg.input().label();
            if current_input != Some(label) {
                out.push_str(&format!(
                    "├── input: {} ({})\n",
                    label,
                    cfg.input().path().display()
                ));
                current_input = Some(label);
            }
            let missing = if cfg.input().exists() { "" } else { " [missing]" };
            match cfg.thread_count() {
                Some(t) => out.push_str(&format!(
                    "│   ├── {} threads={} generations={}{}\n",
                    cfg.mode(),
                    t,
                    cfg.generations(),
                    missing
                )),
                None => out.push_str(&format!(
                    "│   ├── {} generations={}{}\n",
                    cfg.mode(),
                    cfg.generations(),
                    missing
                )),
            }
        }
        out.push_str(&format!(
            "{} runs planned ({} seq, {} omp).\n",
            self.len(),
            self.count(Mode::Sequential),
            self.count(Mode::Parallel)
        ));
        out
    }
}

/// Inclusive size range `from..=to` in increments of `step`
pub fn size_range(from: u64, to: u64, step: u64) -> Result<Vec<u64>, ConfigurationError> {
    if step == 0 || from == 0 || from > to {
        return Err(ConfigurationError::InvalidSizeRange { from, to, step });
    }
    Ok((from..=to).step_by(step as usize).collect())
}

/// Number of hardware threads available to the harness
pub fn available_threads() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}
