//! Error Taxonomy
//!
//! Three failure classes are local to one planned run and never stop a sweep:
//! [`InvocationError`], [`ParseError`] and [`ResourceMissingError`]. They are
//! grouped under [`RunError`] so the controller can keep a single skip list.
//! Sink write failures are fatal and live with the recorder.

use crate::experiment::ExperimentConfiguration;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid values when building a configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("generation count must be positive")]
    ZeroGenerations,

    #[error("parallel thread count must be positive")]
    ZeroThreads,

    #[error("invalid size range: from={from} to={to} step={step}")]
    InvalidSizeRange { from: u64, to: u64, step: u64 },
}

/// The workload could not be started, or exited unsuccessfully
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("failed to start {} ({configuration}): {source}", .program.display())]
    Spawn {
        program: PathBuf,
        configuration: ExperimentConfiguration,
        #[source]
        source: std::io::Error,
    },

    #[error("workload exited with {} ({configuration}): {}", exit_label(.exit_code), .stderr.trim())]
    ExitFailure {
        configuration: ExperimentConfiguration,
        exit_code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

impl InvocationError {
    /// The failure message: stderr for a failed exit, the OS error for a failed start
    pub fn message(&self) -> String {
        match self {
            InvocationError::Spawn { source, .. } => source.to_string(),
            InvocationError::ExitFailure { stderr, .. } => stderr.trim().to_string(),
        }
    }

    /// Configuration that failed
    pub fn configuration(&self) -> &ExperimentConfiguration {
        match self {
            InvocationError::Spawn { configuration, .. }
            | InvocationError::ExitFailure { configuration, .. } => configuration,
        }
    }
}

/// The workload's stdout contained no recognised timing label
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no timing labels found in workload output ({} bytes){}", .raw.len(), context_suffix(.configuration.as_ref()))]
pub struct ParseError {
    /// Text that failed to parse
    pub raw: String,
    /// Configuration that produced the text, once known
    pub configuration: Option<ExperimentConfiguration>,
}

fn context_suffix(configuration: Option<&ExperimentConfiguration>) -> String {
    configuration
        .map(|c| format!(" ({})", c))
        .unwrap_or_default()
}

impl ParseError {
    /// Error for unparseable text with no configuration context yet
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            configuration: None,
        }
    }

    /// Attach the configuration that produced the text
    pub fn with_configuration(mut self, configuration: ExperimentConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }
}

/// The referenced input resource does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("input resource missing: {} ({configuration})", .path.display())]
pub struct ResourceMissingError {
    /// Expected location of the input
    pub path: PathBuf,
    /// Configuration that referenced it
    pub configuration: ExperimentConfiguration,
}

/// Non-fatal outcome of one planned run: the run produced no record
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    ResourceMissing(#[from] ResourceMissingError),
}

impl RunError {
    /// Short classification for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Invocation(_) => "invocation",
            RunError::Parse(_) => "parse",
            RunError::ResourceMissing(_) => "resource-missing",
        }
    }

    /// Configuration the failure belongs to
    pub fn configuration(&self) -> Option<&ExperimentConfiguration> {
        match self {
            RunError::Invocation(e) => Some(e.configuration()),
            RunError::Parse(e) => e.configuration.as_ref(),
            RunError::ResourceMissing(e) => Some(&e.configuration),
        }
    }
}
