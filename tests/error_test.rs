//! Tests for error types

use std::path::PathBuf;

use simsweep::Error;

#[test]
fn test_simulator_not_found_names_path() {
    let error = Error::SimulatorNotFound(PathBuf::from("/opt/gem5/build/X86/gem5.opt"));
    let error_str = format!("{error}");
    assert!(error_str.contains("Simulator not found"));
    assert!(error_str.contains("/opt/gem5/build/X86/gem5.opt"));
    assert!(error_str.contains("No runs were started"));
}

#[test]
fn test_workload_not_found_names_path() {
    let error = Error::WorkloadNotFound(PathBuf::from("bin/qsort"));
    assert!(error.to_string().contains("bin/qsort"));
    assert!(error.is_precondition());
}

#[test]
fn test_empty_axis_error() {
    let error = Error::EmptyAxis("issue_width".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("issue_width"));
    assert!(error_str.contains("at least one value"));
}

#[test]
fn test_empty_constrained_family_error() {
    let error = Error::EmptyConstrainedFamily {
        axes: "oplat, issuelat".to_string(),
        constraint: "sum == 7".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("oplat, issuelat"));
    assert!(error_str.contains("sum == 7"));
}

#[test]
fn test_no_valid_results_error() {
    let error = Error::NoValidResults {
        metric: "sim_seconds".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("No valid results"));
    assert!(error_str.contains("sim_seconds"));
    assert!(!error.is_precondition());
}

#[test]
fn test_stats_unreadable_error() {
    let error = Error::StatsUnreadable {
        path: PathBuf::from("results/width=4/stats.txt"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("results/width=4/stats.txt"));
    assert!(error_str.contains("no such file"));
}

#[test]
fn test_report_write_error() {
    let error = Error::ReportWrite {
        path: PathBuf::from("results/comparison_report.csv"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
    };
    assert!(error.to_string().contains("comparison_report.csv"));
    assert!(!error.is_precondition());
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: Error = json_error.into();
    assert!(error.to_string().contains("JSON error"));
}

#[test]
fn test_error_is_debug() {
    let error = Error::UnknownConfiguration("width=16".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("UnknownConfiguration"));
}
