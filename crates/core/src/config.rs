// Copyright 2025 LLM Perfbench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark configuration.
//!
//! Configuration is layered with the `config` crate:
//!
//! 1. built-in defaults (every field is `#[serde(default)]`),
//! 2. an optional file (TOML, YAML or JSON, picked by extension),
//! 3. `PERFBENCH_`-prefixed environment variables, with `__` separating
//!    nested keys (`PERFBENCH_EXECUTION__TIMEOUT_SECS=5`).
//!
//! # Example
//!
//! ```no_run
//! use llm_perfbench_core::config::BenchConfig;
//!
//! let config = BenchConfig::load(Some("perfbench.toml".as_ref()))?;
//! for target in &config.targets {
//!     println!("{} @ {}", target.model, target.url);
//! }
//! # Ok::<(), llm_perfbench_core::Error>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PERFBENCH";

/// Default completion token budget per request.
pub const DEFAULT_MAX_TOKENS: u32 = 5000;

/// Default wall-clock limit for generated code, in seconds.
pub const DEFAULT_EXECUTION_TIMEOUT_SECS: u64 = 10;

/// Default log file.
pub const DEFAULT_LOG_FILE: &str = "performance_test.log";

/// Default directory for persisted code blocks.
pub const DEFAULT_CODE_OUTPUT_DIR: &str = "generated_code";

/// Default single-turn prompt (Korean: write pandas code that creates a CSV
/// file and prints 5 rows of the DataFrame, wrapped in a python block).
pub const DEFAULT_SINGLE_TURN_PROMPT: &str = "Python의 pandas 라이브러리를 사용하여 CSV 파일을 만들고, \
데이터프레임의 5행을 출력하는 코드를 작성해주세요. 코드는 반드시 ```python ``` 블록으로 감싸주세요.";

/// Default follow-up prompts (Korean: rename the columns to 'num' and
/// 'nickname', then save the DataFrame to 'output.csv').
pub const DEFAULT_MULTI_TURN_PROMPTS: [&str; 2] = [
    "이 코드에 데이터프레임의 열 이름을 'num', 'nickname'으로 설정해주세요. \
수정된 전체 코드를 ```python ``` 블록으로 다시 제공해주세요.",
    "생성된 데이터프레임을 'output.csv' 파일로 저장하는 코드를 추가해주세요. \
수정된 전체 코드를 ```python ``` 블록으로 다시 제공해주세요.",
];

/// One benchmarked endpoint/model pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Chat completions URL
    pub url: String,
    /// Model identifier sent in the request body
    pub model: String,
}

impl TargetConfig {
    /// Create a new target.
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
        }
    }
}

/// Settings for running extracted code blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Fence language tag to extract (```` ```python ````)
    pub language: String,
    /// Interpreter program invoked with the code file as its only argument
    pub interpreter: String,
    /// File extension for persisted and transient code files
    pub extension: String,
    /// Wall-clock limit before the interpreter is killed
    pub timeout_secs: u64,
    /// Directory receiving one file per (model, turn)
    pub output_dir: PathBuf,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            language: "python".to_string(),
            interpreter: "python".to_string(),
            extension: "py".to_string(),
            timeout_secs: DEFAULT_EXECUTION_TIMEOUT_SECS,
            output_dir: PathBuf::from(DEFAULT_CODE_OUTPUT_DIR),
        }
    }
}

impl ExecutionConfig {
    /// Timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Optional report outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory for `results.json` and `summary.md`; disabled when unset
    pub dir: Option<PathBuf>,
    /// Print per-turn details to the console after the summary
    pub detailed_console: bool,
}

/// Complete benchmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Endpoints to benchmark, in order
    pub targets: Vec<TargetConfig>,
    /// Prompt of the single-turn test
    pub single_turn_prompt: String,
    /// Follow-up prompts of the multi-turn test
    pub multi_turn_prompts: Vec<String>,
    /// `max_tokens` sent with every request
    pub max_tokens: u32,
    /// Whole-request HTTP timeout; none waits for the server
    pub request_timeout_secs: Option<u64>,
    /// Code execution settings
    pub execution: ExecutionConfig,
    /// Append-only log file
    pub log_file: PathBuf,
    /// Report outputs
    pub report: ReportConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            targets: vec![
                TargetConfig::new(
                    "http://localhost:11434/v1/chat/completions",
                    "qwen3:30b-a3b-q8_0",
                ),
                TargetConfig::new(
                    "http://localhost:8082/v1/chat/completions",
                    "mlx-community/Qwen3-30B-A3B-8bit",
                ),
            ],
            single_turn_prompt: DEFAULT_SINGLE_TURN_PROMPT.to_string(),
            multi_turn_prompts: DEFAULT_MULTI_TURN_PROMPTS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: None,
            execution: ExecutionConfig::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            report: ReportConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let builder = Self::file_layer(path).add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        let config: BenchConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from defaults and a file, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: BenchConfig = Self::file_layer(Some(path)).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn file_layer(path: Option<&Path>) -> config::ConfigBuilder<config::builder::DefaultState> {
        let builder = config::Config::builder();
        match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder,
        }
    }

    /// Check the configuration for values that cannot produce a run.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(Error::config("at least one target is required"));
        }
        for target in &self.targets {
            if target.model.trim().is_empty() {
                return Err(Error::config(format!(
                    "target {} has an empty model identifier",
                    target.url
                )));
            }
            if !(target.url.starts_with("http://") || target.url.starts_with("https://")) {
                return Err(Error::config(format!(
                    "target {} has an invalid URL {:?}: expected http:// or https://",
                    target.model, target.url
                )));
            }
        }
        if self.max_tokens == 0 {
            return Err(Error::config("max_tokens must be greater than zero"));
        }
        if self.execution.timeout_secs == 0 {
            return Err(Error::config(
                "execution.timeout_secs must be greater than zero",
            ));
        }
        if self.execution.language.trim().is_empty() {
            return Err(Error::config("execution.language must not be empty"));
        }
        if self.execution.interpreter.trim().is_empty() {
            return Err(Error::config("execution.interpreter must not be empty"));
        }
        Ok(())
    }

    /// HTTP request timeout, when configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Total number of turns attempted per target when nothing fails.
    pub fn turns_per_target(&self) -> usize {
        1 + self.multi_turn_prompts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(extension: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{}", extension))
            .tempfile()
            .unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = BenchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tokens, 5000);
        assert_eq!(config.execution.timeout(), Duration::from_secs(10));
        assert_eq!(config.execution.language, "python");
        assert_eq!(config.multi_turn_prompts.len(), 2);
        assert_eq!(config.turns_per_target(), 3);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_default_prompts_ask_for_python_blocks() {
        let config = BenchConfig::default();
        assert_eq!(
            config.single_turn_prompt,
            "Python의 pandas 라이브러리를 사용하여 CSV 파일을 만들고, 데이터프레임의 5행을 출력하는 \
코드를 작성해주세요. 코드는 반드시 ```python ``` 블록으로 감싸주세요."
        );
        assert!(config.multi_turn_prompts[0].contains("'num', 'nickname'"));
        assert!(config.multi_turn_prompts[1].contains("'output.csv'"));
        for prompt in &config.multi_turn_prompts {
            assert!(prompt.ends_with("```python ``` 블록으로 다시 제공해주세요."));
        }
    }

    #[test]
    fn test_from_toml_file_overrides_defaults() {
        let file = write_config(
            "toml",
            r#"
max_tokens = 256
multi_turn_prompts = ["one", "two", "three"]

[[targets]]
url = "http://127.0.0.1:9000/v1/chat/completions"
model = "tiny"

[execution]
timeout_secs = 3
"#,
        );

        let config = BenchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].model, "tiny");
        assert_eq!(config.multi_turn_prompts.len(), 3);
        assert_eq!(config.execution.timeout_secs, 3);
        // untouched nested fields keep their defaults
        assert_eq!(config.execution.interpreter, "python");
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = BenchConfig::from_file(Path::new("/nonexistent/perfbench.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_targets() {
        let config = BenchConfig {
            targets: Vec::new(),
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = BenchConfig {
            targets: vec![TargetConfig::new("localhost:11434", "m")],
            ..BenchConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid URL"));
    }

    #[test]
    fn test_validate_rejects_zero_budgets() {
        let config = BenchConfig {
            max_tokens: 0,
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.execution.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
