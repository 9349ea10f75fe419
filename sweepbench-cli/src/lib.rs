#![warn(missing_docs)]
//! SweepBench CLI Library
//!
//! Command-line front end for benchmark sweeps of an externally built
//! workload. Use `sweepbench::run()` (or `sweepbench_cli::run()`) from `main`.
//!
//! ```text
//! sweepbench sizes   --from 1000 --to 10000 --step 1000 --threads 8
//! sweepbench threads --size 10000 --max-threads 16 --metric computation
//! sweepbench compare --size 5000 --threads 4
//! sweepbench plan threads --max-threads 4
//! sweepbench init > sweep.toml
//! ```

mod config;
mod controller;
mod invoker;
mod metadata;
mod planner;
mod summary;

pub use config::*;
pub use controller::{RunOutcome, SavePaths, SweepController, SweepOutcome};
pub use invoker::{EnvChange, InvocationSpec, Invoker, ProcessInvoker, WorkloadCommand};
pub use metadata::build_report_meta;
pub use planner::{BaselinePolicy, SweepAxis, SweepPlan, available_threads, size_range};
pub use summary::{ThreadAnalysis, analyze_threads, build_report};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use sweepbench_core::{InputReference, Mode};
use sweepbench_report::{
    MeasurementRecorder, OutputFormat, SinkNames, format_human_report, generate_json_report,
};
use sweepbench_stats::CostMetric;
use tracing_subscriber::EnvFilter;

/// SweepBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "sweepbench")]
#[command(
    author,
    version,
    about = "SweepBench - size and thread-count sweeps for external workloads"
)]
pub struct Cli {
    /// Sweep to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: discover sweep.toml upwards from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workload executable
    #[arg(long, global = true)]
    pub workload: Option<PathBuf>,

    /// Directory holding the input grids
    #[arg(long, global = true)]
    pub input_dir: Option<PathBuf>,

    /// Directory for result sinks and workload artifacts
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Generations simulated per run
    #[arg(long, global = true)]
    pub generations: Option<u32>,

    /// Write the JSON sweep report to this file
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    /// Terminal output format: human, json
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only warnings and errors; no progress bar
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep input sizes at a fixed thread count
    Sizes(SizesArgs),
    /// Sweep thread counts on one input and pick the optimum
    Threads(ThreadsArgs),
    /// Sequential vs parallel on one input
    Compare(CompareArgs),
    /// Print a sweep plan without running it
    Plan {
        /// Sweep to plan
        #[command(subcommand)]
        sweep: PlanCommand,
    },
    /// Print a default sweep.toml
    Init,
}

/// Sweeps that can be planned
#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Size sweep
    Sizes(SizesArgs),
    /// Thread sweep
    Threads(ThreadsArgs),
    /// Fixed-size comparison
    Compare(CompareArgs),
}

/// Options of a size sweep
#[derive(Args, Debug, Clone, Default)]
pub struct SizesArgs {
    /// First input size
    #[arg(long)]
    pub from: Option<u64>,
    /// Last input size (inclusive)
    #[arg(long)]
    pub to: Option<u64>,
    /// Size increment
    #[arg(long)]
    pub step: Option<u64>,
    /// Thread count of the parallel runs (default: all cores)
    #[arg(long)]
    pub threads: Option<u32>,
    /// How often to measure the sequential baseline
    #[arg(long, value_enum)]
    pub baseline: Option<BaselinePolicy>,
}

/// Options of a thread sweep
#[derive(Args, Debug, Clone, Default)]
pub struct ThreadsArgs {
    /// Input size
    #[arg(long)]
    pub size: Option<u64>,
    /// Highest thread count to try (default: all cores)
    #[arg(long)]
    pub max_threads: Option<u32>,
    /// How often to measure the sequential baseline
    #[arg(long, value_enum)]
    pub baseline: Option<BaselinePolicy>,
    /// Cost used to pick the optimal thread count:
    /// wall-clock, setup, computation, finalization, phase-total
    #[arg(long)]
    pub metric: Option<CostMetric>,
}

/// Options of a fixed-size comparison
#[derive(Args, Debug, Clone, Default)]
pub struct CompareArgs {
    /// Input size
    #[arg(long)]
    pub size: Option<u64>,
    /// Thread count of the parallel run (default: all cores)
    #[arg(long)]
    pub threads: Option<u32>,
}

/// Run the SweepBench CLI with the process arguments.
///
/// # Returns
/// `Ok(())` when the sweep completed, even if some runs were skipped.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the SweepBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose, cli.quiet);

    if let Commands::Init = cli.command {
        print!("{}", SweepConfig::default_toml());
        return Ok(());
    }

    let config = resolve_config(&cli)?;

    match &cli.command {
        Commands::Sizes(args) => {
            let plan = size_plan(args, &config)?;
            run_sweep(&cli, &config, &plan, config.sweep.metric)
        }
        Commands::Threads(args) => {
            let plan = thread_plan(args, &config)?;
            let metric = args.metric.unwrap_or(config.sweep.metric);
            run_sweep(&cli, &config, &plan, metric)
        }
        Commands::Compare(args) => {
            let plan = comparison_plan(args, &config)?;
            run_sweep(&cli, &config, &plan, config.sweep.metric)
        }
        Commands::Plan { sweep } => {
            let plan = match sweep {
                PlanCommand::Sizes(args) => size_plan(args, &config)?,
                PlanCommand::Threads(args) => thread_plan(args, &config)?,
                PlanCommand::Compare(args) => comparison_plan(args, &config)?,
            };
            print!("{}", plan.describe());
            Ok(())
        }
        Commands::Init => Ok(()),
    }
}

/// `RUST_LOG` wins over the verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default_directive = if quiet {
        "warn"
    } else if verbose {
        "sweepbench=debug"
    } else {
        "sweepbench=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    // A second initialisation (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Layer configuration: defaults → sweep.toml → CLI flags.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<SweepConfig> {
    let mut config = match &cli.config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::discover()?,
    };

    if let Some(workload) = &cli.workload {
        config.workload.executable = workload.clone();
    }
    if let Some(dir) = &cli.input_dir {
        config.inputs.directory = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(generations) = cli.generations {
        config.workload.generations = generations;
    }
    if let Some(report) = &cli.report {
        config.output.report = Some(report.clone());
    }
    if let Some(format) = &cli.format {
        config.output.format = format.clone();
    }

    Ok(config)
}

fn input_for(size: u64, config: &SweepConfig) -> InputReference {
    InputReference::from_size(size, &config.inputs.directory, &config.inputs.pattern)
}

/// Size sweep plan from CLI options over configuration
pub fn size_plan(args: &SizesArgs, config: &SweepConfig) -> anyhow::Result<SweepPlan> {
    let sizes = size_range(
        args.from.unwrap_or(config.inputs.from),
        args.to.unwrap_or(config.inputs.to),
        args.step.unwrap_or(config.inputs.step),
    )?;
    let inputs: Vec<_> = sizes.into_iter().map(|s| input_for(s, config)).collect();
    let threads = args
        .threads
        .or(config.sweep.threads)
        .unwrap_or_else(available_threads);
    let baseline = args.baseline.unwrap_or(config.sweep.size_baseline);
    Ok(SweepPlan::size_sweep(
        &inputs,
        threads,
        config.workload.generations,
        baseline,
    )?)
}

/// Thread sweep plan from CLI options over configuration
pub fn thread_plan(args: &ThreadsArgs, config: &SweepConfig) -> anyhow::Result<SweepPlan> {
    let input = input_for(args.size.unwrap_or(config.inputs.size), config);
    let max_threads = args
        .max_threads
        .or(config.sweep.max_threads)
        .unwrap_or_else(available_threads);
    let baseline = args.baseline.unwrap_or(config.sweep.thread_baseline);
    Ok(SweepPlan::thread_sweep(
        &input,
        max_threads,
        config.workload.generations,
        baseline,
    )?)
}

/// Comparison plan from CLI options over configuration
pub fn comparison_plan(args: &CompareArgs, config: &SweepConfig) -> anyhow::Result<SweepPlan> {
    let input = input_for(args.size.unwrap_or(config.inputs.size), config);
    let threads = args
        .threads
        .or(config.sweep.threads)
        .unwrap_or_else(available_threads);
    Ok(SweepPlan::comparison(
        &input,
        threads,
        config.workload.generations,
    )?)
}

fn workload_command(config: &SweepConfig) -> WorkloadCommand {
    WorkloadCommand {
        program: config.workload.executable.clone(),
        working_dir: config.workload.working_dir.clone(),
        extra_args: config.workload.extra_args.clone(),
        thread_env: config.workload.thread_env.clone(),
    }
}

fn run_sweep(
    cli: &Cli,
    config: &SweepConfig,
    plan: &SweepPlan,
    metric: CostMetric,
) -> anyhow::Result<()> {
    let format: OutputFormat = config
        .output
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let output_dir = &config.output.directory;
    let sinks = SinkNames::with_prefix(&config.output.prefix);
    let recorder = MeasurementRecorder::create(output_dir, &sinks)?;
    let save_paths = SavePaths::new(output_dir, config.output.save_pattern.clone());

    let show_progress = !cli.quiet && std::io::stderr().is_terminal();
    let mut controller =
        SweepController::new(ProcessInvoker, workload_command(config), save_paths, recorder)
            .with_progress(show_progress);

    eprintln!(
        "Running {} sweep: {} runs, workload {}\n",
        plan.axis(),
        plan.len(),
        config.workload.executable.display()
    );

    let outcome = controller.run(plan)?;

    let analysis = if plan.axis() == SweepAxis::Threads {
        Some(analyze_threads(&outcome, metric))
    } else {
        None
    };
    let meta = build_report_meta(
        plan.axis(),
        &config.workload.executable,
        config.workload.generations,
    );
    let report = build_report(
        &outcome,
        analysis.as_ref().and_then(|a| a.as_ref().ok()),
        meta,
    );

    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_report(&report),
    };
    print!("{}", output);

    if let Some(path) = &config.output.report {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = generate_json_report(&report)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Report written to: {}", path.display());
    }

    let recorder = controller.recorder();
    eprintln!(
        "Results: {} ({} rows), {} ({} rows)",
        recorder.sink_path(Mode::Sequential).display(),
        recorder.rows_written(Mode::Sequential),
        recorder.sink_path(Mode::Parallel).display(),
        recorder.rows_written(Mode::Parallel),
    );

    if let Some(Err(e)) = analysis {
        return Err(e.into());
    }
    Ok(())
}
