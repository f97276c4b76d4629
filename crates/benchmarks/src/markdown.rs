//! Markdown output generation for benchmark reports.
//!
//! This module renders a [`BenchmarkReport`] as a markdown document with one
//! table row per model followed by the per-step timings of each model.

use crate::report::{format_secs, format_token_speed};
use crate::result::BenchmarkReport;
use std::fmt::{self, Write};

/// Generate a markdown summary from a benchmark report.
pub fn generate_summary(report: &BenchmarkReport) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_summary(&mut output, report);
    output
}

fn write_summary(output: &mut String, report: &BenchmarkReport) -> fmt::Result {
    writeln!(output, "# Benchmark Summary")?;
    writeln!(output)?;
    writeln!(output, "Started: {}", report.started_at.to_rfc3339())?;
    writeln!(output, "Finished: {}", report.finished_at.to_rfc3339())?;
    writeln!(output)?;
    writeln!(output, "## Models")?;
    writeln!(output)?;
    writeln!(
        output,
        "| Model | Endpoint | Successful | Avg Inference Time | Avg Token Speed |"
    )?;
    writeln!(
        output,
        "|-------|----------|------------|--------------------|-----------------|"
    )?;

    for summary in &report.summaries {
        writeln!(
            output,
            "| {} | {} | {}/{} | {} | {} |",
            summary.model,
            summary.endpoint,
            summary.successful_tests,
            summary.total_tests,
            format_secs(summary.avg_inference_secs()),
            format_token_speed(summary.avg_token_speed())
        )?;
    }

    for summary in &report.summaries {
        writeln!(output)?;
        writeln!(output, "## {}", summary.model)?;
        writeln!(output)?;
        writeln!(output, "| Step | Inference Time |")?;
        writeln!(output, "|------|----------------|")?;
        for step in &summary.steps {
            writeln!(
                output,
                "| {} | {} |",
                step.label,
                match step.inference_secs {
                    Some(_) => format_secs(step.inference_secs),
                    None => "Failed".to_string(),
                }
            )?;
        }
    }

    writeln!(output)?;
    writeln!(output, "---")?;
    writeln!(
        output,
        "Total turns: {} ({} successful)",
        report.results.len(),
        report.successful_tests()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use llm_perfbench_core::{
        Completion, InferenceMetrics, InferenceOutcome, MemorySnapshot, TestKind, TestResult,
    };

    #[test]
    fn test_generate_summary() {
        let ok = TestResult {
            model: "model-a".to_string(),
            endpoint: "http://a/v1/chat/completions".to_string(),
            kind: TestKind::SingleTurn,
            prompt: "p".to_string(),
            inference: InferenceOutcome::Completed(Completion {
                content: String::new(),
                completion_tokens: Some(100),
                metrics: InferenceMetrics {
                    elapsed_secs: 2.0,
                    memory_before: MemorySnapshot::default(),
                    memory_after: MemorySnapshot::default(),
                    token_speed: 50.0,
                },
            }),
            code_execution: None,
        };
        let failed = TestResult {
            model: "model-b".to_string(),
            endpoint: "http://b/v1/chat/completions".to_string(),
            inference: InferenceOutcome::failed("connection refused"),
            ..ok.clone()
        };

        let markdown = generate_summary(&BenchmarkReport::new(Utc::now(), vec![ok, failed]));

        assert!(markdown.contains("| model-a | http://a/v1/chat/completions | 1/1 | 2.00s | 50.00 tokens/s |"));
        assert!(markdown.contains("| model-b | http://b/v1/chat/completions | 0/1 | N/A | N/A |"));
        assert!(markdown.contains("| Single-turn | Failed |"));
        assert!(markdown.contains("Total turns: 2 (1 successful)"));
    }
}
