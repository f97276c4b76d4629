// Copyright 2025 LLM Perfbench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Extraction and execution of fenced code blocks.
//!
//! Extraction is a pure string operation ([`extract_code_blocks`],
//! [`CodeBlockExtractor`]). [`CodeExecutor`] adds the side effects: the first
//! block is persisted under the output directory, copied to a transient file,
//! and run by the configured interpreter under a wall-clock timeout. The
//! transient file is removed when execution ends, whatever the outcome.
//!
//! Execution is not sandboxed: the interpreter runs with the benchmark's own
//! privileges, only the timeout is enforced.

use llm_perfbench_core::{BenchLog, CodeExecution, ExecutionConfig, ExecutionStatus};
use regex::Regex;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Error recorded when the interpreter outlives the timeout.
pub const TIMED_OUT_MESSAGE: &str = "Code execution timed out.";

/// Compiled pattern for fenced blocks of one language tag.
#[derive(Debug, Clone)]
pub struct CodeBlockExtractor {
    language: String,
    pattern: Regex,
}

impl CodeBlockExtractor {
    /// Build an extractor for ```` ```<language> ```` fences.
    pub fn new(language: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?s)```{}[ \t]*\r?\n(.*?)```",
            regex::escape(language)
        ))?;
        Ok(Self {
            language: language.to_string(),
            pattern,
        })
    }

    /// Language tag this extractor matches.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Bodies of every matching block, in order of appearance, untrimmed.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Body of the first matching block.
    pub fn first<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Bodies of every ```` ```<language> ```` block in `text`.
pub fn extract_code_blocks(text: &str, language: &str) -> Vec<String> {
    match CodeBlockExtractor::new(language) {
        Ok(extractor) => extractor.extract(text),
        Err(_) => Vec::new(),
    }
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Extracts, persists and runs generated code.
#[derive(Debug, Clone)]
pub struct CodeExecutor {
    extractor: CodeBlockExtractor,
    config: ExecutionConfig,
}

impl CodeExecutor {
    /// Create an executor from execution settings.
    pub fn new(config: ExecutionConfig) -> llm_perfbench_core::Result<Self> {
        let extractor = CodeBlockExtractor::new(&config.language).map_err(|e| {
            llm_perfbench_core::Error::config(format!(
                "invalid code block language {:?}: {}",
                config.language, e
            ))
        })?;
        Ok(Self { extractor, config })
    }

    /// Execution settings.
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Path the first block of `identifier` is persisted to.
    pub fn persisted_path(&self, identifier: &str) -> PathBuf {
        self.config.output_dir.join(format!(
            "{}.{}",
            sanitize_identifier(identifier),
            self.config.extension
        ))
    }

    /// Extract the first code block from `text` and run it.
    ///
    /// Never fails: every problem is described by the returned
    /// [`CodeExecution`].
    pub async fn execute(&self, text: &str, identifier: &str, log: &mut BenchLog) -> CodeExecution {
        let language = self.extractor.language();
        let Some(code) = self.extractor.first(text) else {
            log.info(format!(
                "No {} code block found for {}.",
                language, identifier
            ));
            return CodeExecution::no_code_block();
        };
        let code = code.trim();
        log.info(format!(
            "Extracted code for execution ({}):\n```{}\n{}\n```",
            identifier, language, code
        ));

        let path = self.persisted_path(identifier);
        match self.persist(&path, code) {
            Ok(()) => log.info(format!("Generated code saved to {}", path.display())),
            Err(e) => log.error(format!(
                "Error saving generated code to {}: {}",
                path.display(),
                e
            )),
        }

        let execution = self.run(code).await;

        log.info(format!("Code Execution Success: {}", execution.success()));
        if !execution.output.is_empty() {
            log.info(format!("Code Execution Output:\n{}", execution.output));
        }
        if !execution.error.is_empty() {
            log.error(format!("Code Execution Error:\n{}", execution.error));
        }
        execution
    }

    fn persist(&self, path: &std::path::Path, code: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        std::fs::write(path, code)
    }

    fn write_transient(&self, code: &str) -> io::Result<tempfile::NamedTempFile> {
        let mut script = tempfile::Builder::new()
            .prefix("perfbench-")
            .suffix(&format!(".{}", self.config.extension))
            .tempfile()?;
        script.write_all(code.as_bytes())?;
        script.flush()?;
        Ok(script)
    }

    async fn run(&self, code: &str) -> CodeExecution {
        let script = match self.write_transient(code) {
            Ok(script) => script,
            Err(e) => return errored(&e),
        };

        let mut command = Command::new(&self.config.interpreter);
        command
            .arg(script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the output future on timeout kills the child.
        let execution = match tokio::time::timeout(self.config.timeout(), command.output()).await {
            Err(_) => {
                tracing::warn!(timeout_secs = self.config.timeout_secs, "Generated code timed out");
                CodeExecution {
                    status: ExecutionStatus::TimedOut,
                    output: String::new(),
                    error: TIMED_OUT_MESSAGE.to_string(),
                }
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => CodeExecution {
                status: ExecutionStatus::InterpreterNotFound,
                output: String::new(),
                error: format!("{} executable not found.", self.config.interpreter),
            },
            Ok(Err(e)) => errored(&e),
            Ok(Ok(output)) => {
                let status = if output.status.success() {
                    ExecutionStatus::Succeeded
                } else {
                    ExecutionStatus::Failed {
                        exit_code: output.status.code(),
                    }
                };
                CodeExecution {
                    status,
                    output: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                    error: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }
            }
        };

        if let Err(e) = script.close() {
            tracing::warn!(error = %e, "Failed to remove transient code file");
        }
        execution
    }
}

fn errored(e: &io::Error) -> CodeExecution {
    CodeExecution {
        status: ExecutionStatus::Errored,
        output: String::new(),
        error: format!("An error occurred during code execution: {}", e),
    }
}
