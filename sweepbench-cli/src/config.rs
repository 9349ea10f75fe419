//! Configuration loading from sweep.toml
//!
//! SweepBench configuration can be specified in a `sweep.toml` file next to the
//! workload. The configuration is discovered by walking up from the current
//! directory; command-line flags override it.

use crate::planner::BaselinePolicy;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sweepbench_stats::CostMetric;

/// File name looked up during discovery
pub const CONFIG_FILE_NAME: &str = "sweep.toml";

/// SweepBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SweepConfig {
    /// The external workload and how to call it
    #[serde(default)]
    pub workload: WorkloadConfig,
    /// Where inputs live and which sizes exist
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Sweep axes and selection
    #[serde(default)]
    pub sweep: SweepSection,
    /// Sinks, artifacts and reports
    #[serde(default)]
    pub output: OutputConfig,
}

/// Workload invocation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Path to the precompiled workload
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Generations simulated per run
    #[serde(default = "default_generations")]
    pub generations: u32,
    /// Working directory for the workload process
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Extra arguments appended after the standard ones
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Environment variable carrying the thread-count hint in parallel mode
    #[serde(default = "default_thread_env")]
    pub thread_env: String,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            generations: default_generations(),
            working_dir: None,
            extra_args: Vec::new(),
            thread_env: default_thread_env(),
        }
    }
}

fn default_executable() -> PathBuf {
    PathBuf::from("./game_of_life")
}
fn default_generations() -> u32 {
    250
}
fn default_thread_env() -> String {
    "OMP_NUM_THREADS".to_string()
}

/// Input resource configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    /// Directory holding the input grids
    #[serde(default = "default_input_dir")]
    pub directory: PathBuf,
    /// File name pattern; `{size}` is replaced by the input size
    #[serde(default = "default_input_pattern")]
    pub pattern: String,
    /// First size of a size sweep
    #[serde(default = "default_from")]
    pub from: u64,
    /// Last size of a size sweep (inclusive)
    #[serde(default = "default_to")]
    pub to: u64,
    /// Size increment
    #[serde(default = "default_step")]
    pub step: u64,
    /// Input size for thread sweeps and comparisons
    #[serde(default = "default_size")]
    pub size: u64,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            directory: default_input_dir(),
            pattern: default_input_pattern(),
            from: default_from(),
            to: default_to(),
            step: default_step(),
            size: default_size(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("step1000_in_250generations")
}
fn default_input_pattern() -> String {
    "random{size}_in.gol".to_string()
}
fn default_from() -> u64 {
    1000
}
fn default_to() -> u64 {
    10_000
}
fn default_step() -> u64 {
    1000
}
fn default_size() -> u64 {
    10_000
}

/// Sweep axis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSection {
    /// Fixed thread count for size sweeps and comparisons (default: all cores)
    #[serde(default)]
    pub threads: Option<u32>,
    /// Upper bound of a thread sweep (default: all cores)
    #[serde(default)]
    pub max_threads: Option<u32>,
    /// How often a size sweep measures the sequential baseline
    #[serde(default = "default_size_baseline")]
    pub size_baseline: BaselinePolicy,
    /// How often a thread sweep measures the sequential baseline
    #[serde(default = "default_thread_baseline")]
    pub thread_baseline: BaselinePolicy,
    /// Cost dimension used to pick the optimal thread count
    #[serde(default)]
    pub metric: CostMetric,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            threads: None,
            max_threads: None,
            size_baseline: default_size_baseline(),
            thread_baseline: default_thread_baseline(),
            metric: CostMetric::default(),
        }
    }
}

fn default_size_baseline() -> BaselinePolicy {
    BaselinePolicy::PerInput
}
fn default_thread_baseline() -> BaselinePolicy {
    BaselinePolicy::Once
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for sinks and workload artifacts
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Prefix for sink file names (`<prefix>cpu_time.csv`)
    #[serde(default)]
    pub prefix: String,
    /// Artifact name pattern: `{size}`, `{mode}` and `{threads}` are substituted
    #[serde(default = "default_save_pattern")]
    pub save_pattern: String,
    /// Write the JSON sweep report here
    #[serde(default)]
    pub report: Option<PathBuf>,
    /// Terminal output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            prefix: String::new(),
            save_pattern: default_save_pattern(),
            report: None,
            format: default_format(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("target/sweepbench")
}
fn default_save_pattern() -> String {
    "{size}_{mode}_out.gol".to_string()
}
fn default_format() -> String {
    "human".to_string()
}

impl SweepConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Find `sweep.toml` by walking up from the current directory
    pub fn discover_path() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Load the discovered configuration, or defaults if there is none.
    ///
    /// A file that exists but does not parse is an error, not a silent fallback.
    pub fn discover() -> anyhow::Result<Self> {
        match Self::discover_path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using discovered configuration");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# SweepBench Configuration

[workload]
# Precompiled workload to benchmark
executable = "./game_of_life"
# Generations simulated per run
generations = 250
# Working directory for the workload (uncomment to enable)
# working_dir = "."
# Extra arguments appended to every invocation
extra_args = []
# Environment variable carrying the thread-count hint in parallel mode
thread_env = "OMP_NUM_THREADS"

[inputs]
# Directory holding the input grids
directory = "step1000_in_250generations"
# Input file name; {size} is replaced by the input size
pattern = "random{size}_in.gol"
# Size sweep range (inclusive)
from = 1000
to = 10000
step = 1000
# Input size for thread sweeps and comparisons
size = 10000

[sweep]
# Fixed thread count for size sweeps (uncomment to enable; default: all cores)
# threads = 8
# Upper bound of a thread sweep (uncomment to enable; default: all cores)
# max_threads = 16
# Sequential baseline: "per-input", "once" or "skip"
size_baseline = "per-input"
thread_baseline = "once"
# Optimal thread count metric: wall-clock, setup, computation, finalization, phase-total
metric = "wall-clock"

[output]
# Directory for result sinks and workload artifacts
directory = "target/sweepbench"
# Prefix for sink names (<prefix>cpu_time.csv, <prefix>openmp_time.csv)
prefix = ""
# Artifact name; {size}, {mode} and {threads} are substituted
save_pattern = "{size}_{mode}_out.gol"
# JSON report path (uncomment to enable)
# report = "target/sweepbench/report.json"
# Terminal output: human or json
format = "human"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();
        assert_eq!(config.workload.generations, 250);
        assert_eq!(config.workload.thread_env, "OMP_NUM_THREADS");
        assert_eq!(config.inputs.pattern, "random{size}_in.gol");
        assert_eq!((config.inputs.from, config.inputs.to, config.inputs.step), (1000, 10_000, 1000));
        assert_eq!(config.sweep.size_baseline, BaselinePolicy::PerInput);
        assert_eq!(config.sweep.thread_baseline, BaselinePolicy::Once);
        assert_eq!(config.sweep.metric, CostMetric::WallClock);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [workload]
            executable = "/opt/gol/GameOfLife"
            generations = 100

            [sweep]
            max_threads = 4
            metric = "computation"
            thread_baseline = "skip"
        "#;

        let config: SweepConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workload.executable, PathBuf::from("/opt/gol/GameOfLife"));
        assert_eq!(config.workload.generations, 100);
        assert_eq!(config.sweep.max_threads, Some(4));
        assert_eq!(config.sweep.metric, CostMetric::Computation);
        assert_eq!(config.sweep.thread_baseline, BaselinePolicy::Skip);
        // Defaults should still apply
        assert_eq!(config.output.format, "human");
        assert_eq!(config.inputs.size, 10_000);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: SweepConfig = toml::from_str(&SweepConfig::default_toml()).unwrap();
        assert_eq!(config.workload.generations, 250);
        assert_eq!(config.output.save_pattern, "{size}_{mode}_out.gol");
        assert_eq!(config.sweep.threads, None);
    }

    #[test]
    fn test_load_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[workload\nexecutable = 3").unwrap();
        let err = SweepConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing"));
    }
}
