//! Benchmark scenarios and reporting for LLM Perfbench.
//!
//! # Quick Start
//!
//! ```no_run
//! use llm_perfbench_benchmarks::{publish, run_benchmark, BenchmarkRunner};
//! use llm_perfbench_core::{BenchConfig, BenchLog};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BenchConfig::default();
//! let mut log = BenchLog::open_append(&config.log_file)?;
//! let mut runner = BenchmarkRunner::new(config.clone())?;
//!
//! let report = run_benchmark(&mut runner, &mut log).await;
//! publish(&report, &config.report, &mut log, &mut std::io::stdout());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`runner`] - single-turn and multi-turn scenarios per target
//! - [`summary`] - per-model aggregation
//! - [`report`] - summary and detail rendering for log and console
//! - [`result`] - the `BenchmarkReport` record
//! - [`io`] - report files (`results.json`, `summary.md`)
//! - [`markdown`] - markdown report generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod io;
pub mod markdown;
pub mod report;
pub mod result;
pub mod runner;
pub mod summary;

pub use error::{BenchmarkError, Result};
pub use result::BenchmarkReport;
pub use runner::BenchmarkRunner;
pub use summary::{summarize, ModelSummary, StepTiming};

use chrono::{Local, Utc};
use llm_perfbench_core::{BenchLog, ReportConfig};
use std::io::Write;

/// Run every configured target and collect the report.
pub async fn run_benchmark(runner: &mut BenchmarkRunner, log: &mut BenchLog) -> BenchmarkReport {
    let started_at = Utc::now();
    let results = runner.run(log).await;
    BenchmarkReport::new(started_at, results)
}

/// Write the summary to the log and `out`, then the optional detail view and
/// report files.
///
/// Output failures are logged and otherwise ignored: a finished benchmark
/// always reports as much as it can.
pub fn publish(report: &BenchmarkReport, config: &ReportConfig, log: &mut BenchLog, out: &mut dyn Write) {
    let lines = report::render_summary(&report.summaries, Local::now());
    if let Err(e) = report::emit(&lines, log, out) {
        tracing::warn!(error = %e, "Failed to write summary to the console");
    }

    if config.detailed_console {
        let details = report::render_details(&report.results);
        if let Err(e) = report::write_lines(&details, out) {
            tracing::warn!(error = %e, "Failed to write details to the console");
        }
    }

    if let Some(dir) = &config.dir {
        match io::write_all_outputs(report, dir) {
            Ok(paths) => {
                for path in paths {
                    log.info(format!("Report written to {}", path.display()));
                }
            }
            Err(e) => log.warn(format!(
                "Failed to write report files to {}: {}",
                dir.display(),
                e
            )),
        }
    }
}
