//! Experiment Configuration
//!
//! One `ExperimentConfiguration` describes exactly one invocation of the
//! workload. Configurations are immutable once built; the only way to get one
//! is through [`ExperimentConfiguration::sequential`] or
//! [`ExperimentConfiguration::parallel`], which validate their inputs.

use crate::SIZE_PLACEHOLDER;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Execution strategy requested of the workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Single-threaded reference implementation
    Sequential,
    /// Thread-parallel (OpenMP) implementation
    Parallel,
}

impl Mode {
    /// Both modes, in the order sinks are laid out
    pub const ALL: [Mode; 2] = [Mode::Sequential, Mode::Parallel];

    /// Value passed to the workload's `--mode` flag
    pub fn cli_name(self) -> &'static str {
        match self {
            Mode::Sequential => "seq",
            Mode::Parallel => "omp",
        }
    }

    /// Label used in artifact and sink file names
    pub fn artifact_label(self) -> &'static str {
        match self {
            Mode::Sequential => "cpu",
            Mode::Parallel => "openmp",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

/// Identifier and location of one input resource (a grid file for the workload)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputReference {
    label: String,
    path: PathBuf,
}

impl InputReference {
    /// Reference an input by an explicit label and path
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    /// Build the reference for an input size: `directory / pattern[{size} := size]`.
    pub fn from_size(size: u64, directory: &Path, pattern: &str) -> Self {
        let label = size.to_string();
        let file_name = pattern.replace(SIZE_PLACEHOLDER, &label);
        Self {
            path: directory.join(file_name),
            label,
        }
    }

    /// Short identifier (the size for generated references)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Filesystem location of the input
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the input resource is present
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// A single point in the experiment matrix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExperimentConfiguration {
    mode: Mode,
    threads: Option<NonZeroU32>,
    input: InputReference,
    generations: NonZeroU32,
}

impl ExperimentConfiguration {
    /// Sequential run. There is no thread count to give: sequential runs never carry one.
    pub fn sequential(
        input: InputReference,
        generations: u32,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            mode: Mode::Sequential,
            threads: None,
            input,
            generations: NonZeroU32::new(generations).ok_or(ConfigurationError::ZeroGenerations)?,
        })
    }

    /// Parallel run with an explicit thread count
    pub fn parallel(
        input: InputReference,
        thread_count: u32,
        generations: u32,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            mode: Mode::Parallel,
            threads: Some(NonZeroU32::new(thread_count).ok_or(ConfigurationError::ZeroThreads)?),
            input,
            generations: NonZeroU32::new(generations).ok_or(ConfigurationError::ZeroGenerations)?,
        })
    }

    /// Execution mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Thread count; `None` in sequential mode
    pub fn thread_count(&self) -> Option<u32> {
        self.threads.map(NonZeroU32::get)
    }

    /// Input resource this run reads
    pub fn input(&self) -> &InputReference {
        &self.input
    }

    /// Number of generations the workload simulates
    pub fn generations(&self) -> u32 {
        self.generations.get()
    }
}

impl fmt::Display for ExperimentConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode={}", self.mode)?;
        if let Some(threads) = self.threads {
            write!(f, " threads={}", threads)?;
        }
        write!(
            f,
            " input={} generations={}",
            self.input.label, self.generations
        )
    }
}

/// What one blocking invocation of the workload produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRunResult {
    /// Process exited with status 0
    pub exit_success: bool,
    /// Exit code, if the process exited normally (`None` when killed by a signal)
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Wall-clock time measured around the blocking call
    pub wall_clock: Duration,
}
