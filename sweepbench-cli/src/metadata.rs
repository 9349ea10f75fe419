//! System Metadata Collection
//!
//! Host details recorded in the sweep report so results from different
//! machines are not compared blindly. Linux-specific data (CPU model)
//! degrades to "Unknown" elsewhere.

use crate::planner::{SweepAxis, available_threads};
use chrono::Utc;
use std::path::Path;
use sweepbench_report::{ReportMeta, SCHEMA_VERSION, SystemInfo};

/// Build report metadata for a sweep of `workload` along `axis`
pub fn build_report_meta(axis: SweepAxis, workload: &Path, generations: u32) -> ReportMeta {
    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        axis: axis.name().to_string(),
        workload: workload.display().to_string(),
        generations,
        system: system_info(),
    }
}

fn system_info() -> SystemInfo {
    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu: get_cpu_model().unwrap_or_else(|| "Unknown".to_string()),
        cpu_cores: available_threads(),
    }
}

/// Get CPU model name from /proc/cpuinfo (Linux only)
fn get_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| cpu_model_from(&content))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn cpu_model_from(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .find(|l| l.starts_with("model name"))
        .and_then(|l| l.split(':').nth(1))
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_model_from_cpuinfo() {
        let cpuinfo = "processor\t: 0\nvendor_id\t: GenuineIntel\nmodel name\t: Intel(R) Xeon(R) CPU @ 2.20GHz\n";
        assert_eq!(
            cpu_model_from(cpuinfo).as_deref(),
            Some("Intel(R) Xeon(R) CPU @ 2.20GHz")
        );
        assert_eq!(cpu_model_from("processor: 0\n"), None);
    }

    #[test]
    fn test_report_meta() {
        let meta = build_report_meta(SweepAxis::Threads, Path::new("./game_of_life"), 250);
        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert_eq!(meta.axis, "threads");
        assert_eq!(meta.workload, "./game_of_life");
        assert_eq!(meta.generations, 250);
        assert!(meta.system.cpu_cores >= 1);
        assert!(!meta.system.os.is_empty());
    }
}
