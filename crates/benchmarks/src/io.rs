//! I/O operations for benchmark reports.
//!
//! This module writes the optional report files:
//! `results.json` (the full [`BenchmarkReport`]) and `summary.md`.

use crate::markdown;
use crate::result::BenchmarkReport;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// JSON report file name.
pub const RESULTS_FILE: &str = "results.json";

/// Markdown summary file name.
pub const SUMMARY_FILE: &str = "summary.md";

/// Write the report as pretty-printed JSON.
pub fn write_report_json(report: &BenchmarkReport, path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(path, json)
}

/// Write the markdown summary.
pub fn write_summary(report: &BenchmarkReport, path: impl AsRef<Path>) -> io::Result<()> {
    fs::write(path, markdown::generate_summary(report))
}

/// Write `results.json` and `summary.md` into `dir`, creating it if needed.
///
/// Returns the paths written.
pub fn write_all_outputs(report: &BenchmarkReport, dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let results_path = dir.join(RESULTS_FILE);
    write_report_json(report, &results_path)?;

    let summary_path = dir.join(SUMMARY_FILE);
    write_summary(report, &summary_path)?;

    Ok(vec![results_path, summary_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use llm_perfbench_core::{InferenceOutcome, TestKind, TestResult};

    fn report() -> BenchmarkReport {
        BenchmarkReport::new(
            Utc::now(),
            vec![TestResult {
                model: "m".to_string(),
                endpoint: "http://localhost:1".to_string(),
                kind: TestKind::SingleTurn,
                prompt: "p".to_string(),
                inference: InferenceOutcome::failed("connection refused"),
                code_execution: None,
            }],
        )
    }

    #[test]
    fn test_write_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");

        let written = write_all_outputs(&report(), &out).unwrap();

        assert_eq!(written, vec![out.join(RESULTS_FILE), out.join(SUMMARY_FILE)]);
        let restored: BenchmarkReport =
            serde_json::from_str(&fs::read_to_string(out.join(RESULTS_FILE)).unwrap()).unwrap();
        assert_eq!(restored.results.len(), 1);
        assert_eq!(restored.summaries[0].total_tests, 1);
        assert!(fs::read_to_string(out.join(SUMMARY_FILE))
            .unwrap()
            .contains("# Benchmark Summary"));
    }

    #[test]
    fn test_write_into_unwritable_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "file").unwrap();

        assert!(write_all_outputs(&report(), blocker.join("reports")).is_err());
    }
}
