//! Duration Parsing and Rendering
//!
//! The workload reports timings as `<number><unit>` (e.g. `340ms`, `1.5s`).
//! Everything is normalised to [`Duration`] at nanosecond precision before it
//! is stored, and rendered back in one canonical unit (milliseconds).

use std::time::Duration;
use thiserror::Error;

/// Errors from [`parse_duration`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("empty duration string")]
    Empty,

    #[error("invalid duration number: {0}")]
    InvalidNumber(String),

    #[error("unknown duration unit: {0}")]
    UnknownUnit(String),
}

/// Parse a duration string (e.g. "3s", "500ms", "12 us", "2m").
///
/// A bare number is read as seconds. Negative and non-finite values are rejected.
pub fn parse_duration(s: &str) -> Result<Duration, DurationParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }

    // Find where the number ends and unit begins
    let (num_part, unit_part) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| s.split_at(i))
        .unwrap_or((s, "s"));

    let num_part = num_part.trim();
    let value: f64 = num_part
        .parse()
        .map_err(|_| DurationParseError::InvalidNumber(num_part.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(DurationParseError::InvalidNumber(num_part.to_string()));
    }

    let nanos_per_unit: f64 = match unit_part.trim().to_lowercase().as_str() {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1_000.0,
        "ms" => 1_000_000.0,
        "s" | "sec" | "" => 1_000_000_000.0,
        "m" | "min" => 60_000_000_000.0,
        other => return Err(DurationParseError::UnknownUnit(other.to_string())),
    };

    // `u64::MAX as f64` is 2^64, the first value that does not fit
    let nanos = (value * nanos_per_unit).round();
    if nanos >= u64::MAX as f64 {
        return Err(DurationParseError::InvalidNumber(num_part.to_string()));
    }
    Ok(Duration::from_nanos(nanos as u64))
}

/// Render a duration in the canonical sink unit: milliseconds, three decimals.
pub fn format_millis(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64() * 1_000.0)
}

/// Render a duration for humans, picking the largest unit that keeps the value >= 1.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos() as f64;
    if nanos < 1_000.0 {
        format!("{:.0} ns", nanos)
    } else if nanos < 1_000_000.0 {
        format!("{:.2} µs", nanos / 1_000.0)
    } else if nanos < 1_000_000_000.0 {
        format!("{:.2} ms", nanos / 1_000_000.0)
    } else {
        format!("{:.3} s", nanos / 1_000_000_000.0)
    }
}
