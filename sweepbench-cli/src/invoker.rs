//! Workload Invocation
//!
//! Runs one configuration of the external workload as a child process.
//!
//! The thread-count hint travels only inside the [`InvocationSpec`]: as the
//! `--threads` argument and as an environment entry on the child's command.
//! The harness's own environment is never touched, and sequential runs have
//! the hint explicitly removed so an inherited value cannot leak in.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use sweepbench_core::{ExperimentConfiguration, InvocationError, Mode, RawRunResult};

/// Static part of the command line: which program, where, with what extras
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadCommand {
    /// Workload executable
    pub program: PathBuf,
    /// Working directory for the child process
    pub working_dir: Option<PathBuf>,
    /// Arguments appended after the standard ones
    pub extra_args: Vec<String>,
    /// Environment variable carrying the thread-count hint
    pub thread_env: String,
}

impl WorkloadCommand {
    /// Command for `program` with no extras and the OpenMP thread variable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
            extra_args: Vec::new(),
            thread_env: "OMP_NUM_THREADS".to_string(),
        }
    }
}

/// Environment change applied to one child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvChange {
    /// Set a variable
    Set(String, String),
    /// Remove an inherited variable
    Remove(String),
}

/// Fully resolved invocation of one configuration
#[derive(Debug, Clone)]
pub struct InvocationSpec {
    program: PathBuf,
    args: Vec<OsString>,
    env: Vec<EnvChange>,
    load_path: PathBuf,
    working_dir: Option<PathBuf>,
    configuration: ExperimentConfiguration,
}

/// Absolute form of `path` when `anchored`; unchanged otherwise
fn resolve(path: &Path, anchored: bool) -> PathBuf {
    if anchored && path.is_relative() {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    }
}

impl InvocationSpec {
    /// Build the invocation contract:
    /// `--load <in> --save <out> --generations <N> --measure --mode {seq|omp} [--threads <T>]`
    ///
    /// With a working directory set, relative program, input and save paths are
    /// made absolute against the harness's directory so the child opens the
    /// same files the harness checked.
    pub fn build(
        workload: &WorkloadCommand,
        configuration: &ExperimentConfiguration,
        save_path: &Path,
    ) -> Self {
        let anchored = workload.working_dir.is_some();
        let load_path = resolve(configuration.input().path(), anchored);
        let save_path = resolve(save_path, anchored);
        let program = if anchored && workload.program.components().count() > 1 {
            resolve(&workload.program, true)
        } else {
            workload.program.clone()
        };

        let mut args: Vec<OsString> = vec![
            "--load".into(),
            load_path.clone().into(),
            "--save".into(),
            save_path.into(),
            "--generations".into(),
            configuration.generations().to_string().into(),
            "--measure".into(),
            "--mode".into(),
            configuration.mode().cli_name().into(),
        ];

        let env = match (configuration.mode(), configuration.thread_count()) {
            (Mode::Parallel, Some(threads)) => {
                args.push("--threads".into());
                args.push(threads.to_string().into());
                vec![EnvChange::Set(workload.thread_env.clone(), threads.to_string())]
            }
            _ => vec![EnvChange::Remove(workload.thread_env.clone())],
        };

        args.extend(workload.extra_args.iter().map(OsString::from));

        Self {
            program,
            args,
            env,
            load_path,
            working_dir: workload.working_dir.clone(),
            configuration: configuration.clone(),
        }
    }

    /// Input file exactly as passed to `--load`
    pub fn load_path(&self) -> &Path {
        &self.load_path
    }

    /// Program to run
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments in order
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Environment changes for the child only
    pub fn env(&self) -> &[EnvChange] {
        &self.env
    }

    /// Configuration this invocation runs
    pub fn configuration(&self) -> &ExperimentConfiguration {
        &self.configuration
    }

    /// Shell-like rendering for logs
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for change in &self.env {
            match change {
                EnvChange::Set(key, value) => {
                    command.env(key, value);
                }
                EnvChange::Remove(key) => {
                    command.env_remove(key);
                }
            }
        }
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// Runs invocations to completion
pub trait Invoker {
    /// Run `spec` and block until it exits.
    ///
    /// `Err` only when the process could not be started. A nonzero exit is a
    /// normal result with `exit_success == false`.
    fn invoke(&mut self, spec: &InvocationSpec) -> Result<RawRunResult, InvocationError>;
}

/// [`Invoker`] that spawns the real workload process
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
    fn invoke(&mut self, spec: &InvocationSpec) -> Result<RawRunResult, InvocationError> {
        tracing::debug!(command = %spec.command_line(), "invoking workload");

        let mut command = spec.to_command();
        let start = Instant::now();
        // `output()` waits for exit and closes every pipe, on success and failure alike
        let output = command.output().map_err(|source| InvocationError::Spawn {
            program: spec.program.clone(),
            configuration: spec.configuration.clone(),
            source,
        })?;
        let wall_clock = start.elapsed();

        Ok(RawRunResult {
            exit_success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            wall_clock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepbench_core::InputReference;

    fn input() -> InputReference {
        InputReference::from_size(7000, Path::new("in"), "random{size}_in.gol")
    }

    fn args(spec: &InvocationSpec) -> Vec<String> {
        spec.args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_parallel_invocation() {
        let cfg = ExperimentConfiguration::parallel(input(), 4, 250).unwrap();
        let spec = InvocationSpec::build(
            &WorkloadCommand::new("./game_of_life"),
            &cfg,
            Path::new("out/7000_openmp_out.gol"),
        );

        assert_eq!(
            args(&spec),
            vec![
                "--load",
                "in/random7000_in.gol",
                "--save",
                "out/7000_openmp_out.gol",
                "--generations",
                "250",
                "--measure",
                "--mode",
                "omp",
                "--threads",
                "4"
            ]
        );
        assert_eq!(
            spec.env(),
            &[EnvChange::Set("OMP_NUM_THREADS".to_string(), "4".to_string())]
        );
    }

    #[test]
    fn test_sequential_invocation_has_no_thread_hint() {
        let cfg = ExperimentConfiguration::sequential(input(), 250).unwrap();
        let spec = InvocationSpec::build(
            &WorkloadCommand::new("./game_of_life"),
            &cfg,
            Path::new("out/7000_cpu_out.gol"),
        );

        let args = args(&spec);
        assert!(!args.iter().any(|a| a == "--threads"));
        assert_eq!(&args[7..], &["--mode", "seq"]);
        assert_eq!(spec.env(), &[EnvChange::Remove("OMP_NUM_THREADS".to_string())]);
    }

    #[test]
    fn test_extra_args_and_command_line() {
        let mut workload = WorkloadCommand::new("/opt/gol");
        workload.extra_args = vec!["--quiet".to_string()];
        workload.thread_env = "RAYON_NUM_THREADS".to_string();
        let cfg = ExperimentConfiguration::parallel(input(), 2, 10).unwrap();
        let spec = InvocationSpec::build(&workload, &cfg, Path::new("o.gol"));

        assert_eq!(args(&spec).last().map(String::as_str), Some("--quiet"));
        assert_eq!(
            spec.env(),
            &[EnvChange::Set("RAYON_NUM_THREADS".to_string(), "2".to_string())]
        );
        assert!(spec.command_line().starts_with("/opt/gol --load in/random7000_in.gol"));
    }

    #[test]
    fn test_working_dir_anchors_relative_paths() {
        let mut workload = WorkloadCommand::new("./game_of_life");
        workload.working_dir = Some(PathBuf::from("bench"));
        let cfg = ExperimentConfiguration::parallel(input(), 2, 10).unwrap();
        let spec = InvocationSpec::build(&workload, &cfg, Path::new("out/7000_openmp_out.gol"));

        let args = args(&spec);
        let load = Path::new(&args[1]);
        let save = Path::new(&args[3]);
        assert!(load.is_absolute());
        assert!(load.ends_with("in/random7000_in.gol"));
        assert_eq!(spec.load_path(), load);
        assert!(save.is_absolute());
        assert!(save.ends_with("out/7000_openmp_out.gol"));
        assert!(spec.program().is_absolute());

        // Bare program names still go through PATH lookup
        let mut workload = WorkloadCommand::new("gol");
        workload.working_dir = Some(PathBuf::from("bench"));
        let spec = InvocationSpec::build(&workload, &cfg, Path::new("o.gol"));
        assert_eq!(spec.program(), Path::new("gol"));
    }

    #[test]
    fn test_paths_untouched_without_working_dir() {
        let cfg = ExperimentConfiguration::sequential(input(), 10).unwrap();
        let spec = InvocationSpec::build(
            &WorkloadCommand::new("./game_of_life"),
            &cfg,
            Path::new("o.gol"),
        );
        assert_eq!(spec.load_path(), Path::new("in/random7000_in.gol"));
        assert_eq!(spec.program(), Path::new("./game_of_life"));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let cfg = ExperimentConfiguration::sequential(input(), 1).unwrap();
        let spec = InvocationSpec::build(
            &WorkloadCommand::new("/definitely/not/a/workload"),
            &cfg,
            Path::new("o.gol"),
        );
        let err = ProcessInvoker.invoke(&spec).unwrap_err();
        assert!(matches!(err, InvocationError::Spawn { .. }));
        assert_eq!(err.configuration(), &cfg);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_a_result() {
        let cfg = ExperimentConfiguration::sequential(input(), 1).unwrap();
        let mut spec = InvocationSpec::build(&WorkloadCommand::new("sh"), &cfg, Path::new("o.gol"));
        spec.args = vec!["-c".into(), "echo 'file not found' >&2; exit 1".into()];

        let raw = ProcessInvoker.invoke(&spec).unwrap();
        assert!(!raw.exit_success);
        assert_eq!(raw.exit_code, Some(1));
        assert_eq!(raw.stderr.trim(), "file not found");
    }

    #[cfg(unix)]
    #[test]
    fn test_thread_hint_reaches_child_only() {
        let cfg = ExperimentConfiguration::parallel(input(), 3, 1).unwrap();
        let mut spec = InvocationSpec::build(&WorkloadCommand::new("sh"), &cfg, Path::new("o.gol"));
        spec.args = vec!["-c".into(), "echo \"threads=$OMP_NUM_THREADS\"".into()];

        let raw = ProcessInvoker.invoke(&spec).unwrap();
        assert!(raw.exit_success);
        assert_eq!(raw.stdout.trim(), "threads=3");
        assert_ne!(std::env::var("OMP_NUM_THREADS").ok().as_deref(), Some("3"));
    }
}
