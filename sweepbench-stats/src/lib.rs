#![warn(missing_docs)]
//! SweepBench Statistics
//!
//! Turns the recorded trials of a thread sweep into decisions:
//! - Cost extraction along a configurable dimension (`CostMetric`)
//! - Optimal thread-count selection with a deterministic tie-break
//! - Speedup and parallel efficiency against the sequential baseline

mod scaling;
mod selector;

pub use scaling::{ScalingPoint, scaling_table};
pub use selector::{Candidate, CostMetric, EmptySweepError, Selection, select_optimal};
