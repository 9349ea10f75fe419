//! Timing Report Parser
//!
//! The workload prints its phase timings as plain text, one field per line:
//!
//! ```text
//! setup: 12ms
//! computation: 340ms
//! finalization: 5ms
//! ```
//!
//! Grammar per line: `label ":" number unit`, case-insensitive label, free
//! whitespace. Lines that do not match (argument echoes, banners, a known label
//! with an unreadable value) are skipped. A label that never appears leaves its
//! field empty; only a report with no recognised label at all is an error.

use crate::duration::parse_duration;
use crate::error::ParseError;
use crate::measurement::{Measurement, Phase};
use regex::Regex;
use std::sync::LazyLock;

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(setup|computation|finalization)\s*:\s*(\S.*?)\s*$")
        .expect("timing line pattern is valid")
});

/// Extract phase timings from the workload's stdout.
///
/// Pure: the same text always yields the same `Measurement`. When a label
/// repeats, the last occurrence wins.
pub fn parse_measurement(stdout: &str) -> Result<Measurement, ParseError> {
    let mut measurement = Measurement::default();
    let mut recognised = 0usize;

    for line in stdout.lines() {
        let Some(caps) = TIMING_LINE.captures(line) else {
            continue;
        };
        let Some(phase) = Phase::from_label(&caps[1]) else {
            continue;
        };

        match parse_duration(&caps[2]) {
            Ok(value) => {
                measurement.set_phase(phase, value);
                recognised += 1;
            }
            Err(e) => {
                tracing::trace!(line, error = %e, "ignoring timing line with unreadable value");
            }
        }
    }

    if recognised == 0 {
        return Err(ParseError::new(stdout));
    }
    Ok(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_all_three_phases() {
        let m = parse_measurement("setup: 12ms\ncomputation: 340ms\nfinalization: 5ms\n").unwrap();
        assert_eq!(m.setup, Some(Duration::from_millis(12)));
        assert_eq!(m.computation, Some(Duration::from_millis(340)));
        assert_eq!(m.finalization, Some(Duration::from_millis(5)));
    }

    #[test]
    fn test_any_order_and_extra_lines() {
        let stdout = "Received Arguments:\n  argv[0]: ./game_of_life\n-----------------------\n\
                      Finalization: 0.5 s\nMode: Parallel (OpenMP)\nSetup : 1500us\n";
        let m = parse_measurement(stdout).unwrap();
        assert_eq!(m.setup, Some(Duration::from_micros(1500)));
        assert_eq!(m.computation, None);
        assert_eq!(m.finalization, Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_units_are_normalised() {
        let m = parse_measurement("computation: 2s").unwrap();
        assert_eq!(m.computation, Some(Duration::from_secs(2)));
        let m = parse_measurement("computation: 2000000000ns").unwrap();
        assert_eq!(m.computation, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_no_labels_is_parse_error() {
        let err = parse_measurement("Error: nothing to see\n").unwrap_err();
        assert_eq!(err.raw, "Error: nothing to see\n");
        assert!(err.configuration.is_none());

        assert!(parse_measurement("").is_err());
    }

    #[test]
    fn test_unreadable_value_is_ignored() {
        let m = parse_measurement("setup: fast\ncomputation: 3ms").unwrap();
        assert_eq!(m.setup, None);
        assert_eq!(m.computation, Some(Duration::from_millis(3)));

        // A known label whose value is unreadable does not count as recognised
        assert!(parse_measurement("setup: n/a").is_err());
    }

    #[test]
    fn test_label_must_start_the_line() {
        assert!(parse_measurement("pre-setup: 3ms").is_err());
    }

    #[test]
    fn test_last_occurrence_wins() {
        let m = parse_measurement("setup: 1ms\nsetup: 2ms").unwrap();
        assert_eq!(m.setup, Some(Duration::from_millis(2)));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "setup: 12ms\r\ncomputation: 340.25ms\r\nnoise\r\n";
        assert_eq!(parse_measurement(text).unwrap(), parse_measurement(text).unwrap());
    }
}
