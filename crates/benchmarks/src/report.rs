//! Text rendering of benchmark results.
//!
//! The summary section is rendered once into lines and then written both to
//! the benchmark log and to the console, so the two always match.

use crate::summary::ModelSummary;
use chrono::{DateTime, TimeZone};
use llm_perfbench_core::{BenchLog, TestResult};
use std::fmt::Display;
use std::io::{self, Write};

/// Placeholder for values that cannot be computed.
pub const NOT_APPLICABLE: &str = "N/A";

/// `"2.00s"`, or `"N/A"`.
pub fn format_secs(secs: Option<f64>) -> String {
    match secs {
        Some(secs) => format!("{:.2}s", secs),
        None => NOT_APPLICABLE.to_string(),
    }
}

/// `"50.00 tokens/s"`, or `"N/A"`.
pub fn format_token_speed(speed: Option<f64>) -> String {
    match speed {
        Some(speed) => format!("{:.2} tokens/s", speed),
        None => NOT_APPLICABLE.to_string(),
    }
}

/// Render the summary section for every model.
pub fn render_summary<Tz>(summaries: &[ModelSummary], generated_at: DateTime<Tz>) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = vec![format!(
        "=== PERFORMANCE TEST RUN SUMMARY: {} ===",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    )];

    for summary in summaries {
        lines.push(format!(
            "Tested Model: {} ({})",
            summary.model, summary.endpoint
        ));
        lines.push(format!("Total Tests Run: {}", summary.total_tests));
        lines.push(format!("Successful Tests: {}", summary.successful_tests));
        lines.push(format!(
            "Average Inference Time (Successful Tests): {}",
            format_secs(summary.avg_inference_secs())
        ));
        lines.push(format!(
            "Average Token Generation Speed (Successful Tests): {}",
            format_token_speed(summary.avg_token_speed())
        ));
        lines.push("--- Per-Step Times ---".to_string());
        for step in &summary.steps {
            match step.inference_secs {
                Some(secs) => lines.push(format!(
                    "{}: Total Inference Time: {}",
                    step.label,
                    format_secs(Some(secs))
                )),
                None => lines.push(format!("{}: Test Failed - Time N/A", step.label)),
            }
        }
    }

    lines.push("=== PERFORMANCE TEST RUN SUMMARY END ===".to_string());
    lines
}

/// Render the per-turn detail view.
pub fn render_details(results: &[TestResult]) -> Vec<String> {
    let mut lines = Vec::new();
    for result in results {
        lines.push(format!("--- {} [{}] ---", result.kind.label(), result.model));
        lines.push(format!("Prompt: {}", result.prompt));
        lines.push(format!("Success: {}", result.success()));

        let Some(completion) = result.inference.completion() else {
            lines.push(format!(
                "Test Failed: {}",
                result.failure_reason().unwrap_or("unknown error")
            ));
            continue;
        };

        let metrics = &completion.metrics;
        lines.push(format!(
            "Total Inference Time: {}",
            format_secs(Some(metrics.elapsed_secs))
        ));
        lines.push(format!(
            "System Memory Usage Before: {:.2} GB ({:.2}%)",
            metrics.memory_before.used_gb, metrics.memory_before.percent
        ));
        lines.push(format!(
            "System Memory Usage After: {:.2} GB ({:.2}%)",
            metrics.memory_after.used_gb, metrics.memory_after.percent
        ));
        lines.push(format!(
            "Token generation speed: {}",
            format_token_speed(Some(metrics.token_speed))
        ));

        if let Some(execution) = &result.code_execution {
            lines.push(format!(
                "Code Execution Success: {} ({})",
                execution.success(),
                execution.status
            ));
            if !execution.output.is_empty() {
                lines.push(format!("Code Execution Output:\n{}", execution.output));
            }
            if !execution.error.is_empty() {
                lines.push(format!("Code Execution Error:\n{}", execution.error));
            }
        }
    }
    lines
}

/// Write the rendered lines to the log and to `out`.
pub fn emit<S: AsRef<str>>(lines: &[S], log: &mut BenchLog, out: &mut dyn Write) -> io::Result<()> {
    log.info_lines(lines);
    write_lines(lines, out)
}

/// Write the rendered lines to `out` only.
pub fn write_lines<S: AsRef<str>>(lines: &[S], out: &mut dyn Write) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{}", line.as_ref())?;
    }
    out.flush()
}
