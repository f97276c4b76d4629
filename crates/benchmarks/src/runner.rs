//! Benchmark scenarios.
//!
//! For every configured target the runner issues the single-turn test and
//! then the multi-turn test, one request at a time:
//!
//! ```text
//! single-turn:  ISSUED -> DONE
//! multi-turn:   AWAITING_TURN -> (ok)   -> APPEND_ASSISTANT_REPLY -> AWAITING_TURN
//!               AWAITING_TURN -> (fail) -> ABORTED
//! ```
//!
//! A failed multi-turn turn is recorded and the remaining turns for that
//! target are never requested.

use crate::error::Result;
use chrono::Local;
use llm_perfbench_adapters::{CodeExecutor, InferenceClient, MemoryProbe, SystemMemoryProbe};
use llm_perfbench_core::{BenchConfig, BenchLog, ConversationHistory, TargetConfig, TestKind, TestResult};

/// Drives the benchmark scenarios against every configured target.
pub struct BenchmarkRunner {
    config: BenchConfig,
    client: InferenceClient,
    executor: CodeExecutor,
    probe: Box<dyn MemoryProbe>,
}

impl BenchmarkRunner {
    /// Create a runner that samples real system memory.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: BenchConfig) -> Result<Self> {
        config.validate()?;
        let client = InferenceClient::new(config.request_timeout())?;
        let executor = CodeExecutor::new(config.execution.clone())?;
        Ok(Self {
            config,
            client,
            executor,
            probe: Box::new(SystemMemoryProbe::new()),
        })
    }

    /// Replace the memory probe.
    pub fn with_memory_probe(mut self, probe: impl MemoryProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Benchmark every target in order and return all turn results.
    pub async fn run(&mut self, log: &mut BenchLog) -> Vec<TestResult> {
        let targets = self.config.targets.clone();
        let mut results = Vec::new();
        for target in &targets {
            results.extend(self.run_target(target, log).await);
        }
        results
    }

    /// Run the single-turn and multi-turn tests against one target.
    pub async fn run_target(&mut self, target: &TargetConfig, log: &mut BenchLog) -> Vec<TestResult> {
        tracing::info!(
            model = %target.model,
            url = %target.url,
            turns = self.config.turns_per_target(),
            "Benchmarking target"
        );
        log.info(format!(
            "=== PERFORMANCE TEST RUN START: {} ({}) - {} ===",
            target.model,
            target.url,
            Local::now()
        ));

        let mut results = vec![self.run_single_turn(target, log).await];
        results.extend(self.run_multi_turn(target, log).await);

        log.info(format!(
            "=== PERFORMANCE TEST RUN END: {} - {} ===",
            target.model,
            Local::now()
        ));
        results
    }

    /// One prompt with no prior history.
    pub async fn run_single_turn(&mut self, target: &TargetConfig, log: &mut BenchLog) -> TestResult {
        log.info("--- Single-turn Test ---");
        let prompt = self.config.single_turn_prompt.clone();
        let history = ConversationHistory::single(prompt.as_str());
        self.run_turn(target, TestKind::SingleTurn, &prompt, &history, log)
            .await
    }

    /// The follow-up prompts, sharing one conversation history.
    ///
    /// Stops at the first failed turn; the failed turn is the last result.
    pub async fn run_multi_turn(&mut self, target: &TargetConfig, log: &mut BenchLog) -> Vec<TestResult> {
        log.info("--- Multi-turn Test ---");
        let prompts = self.config.multi_turn_prompts.clone();
        let mut history = ConversationHistory::new();
        let mut results = Vec::with_capacity(prompts.len());

        for (index, prompt) in prompts.iter().enumerate() {
            let turn = index + 1;
            log.info(format!("- Turn {} -", turn));

            history.push_user(prompt.as_str());
            let result = self
                .run_turn(target, TestKind::MultiTurn { turn }, prompt, &history, log)
                .await;

            if !result.success() {
                log.error(format!(
                    "Multi-turn test failed at turn {}. Aborting multi-turn test.",
                    turn
                ));
                tracing::warn!(model = %target.model, turn, "Multi-turn test aborted");
                results.push(result);
                break;
            }

            history.push_assistant(result.response_content());
            results.push(result);
        }

        results
    }

    async fn run_turn(
        &mut self,
        target: &TargetConfig,
        kind: TestKind,
        prompt: &str,
        history: &ConversationHistory,
        log: &mut BenchLog,
    ) -> TestResult {
        let inference = self
            .client
            .chat(
                target,
                history,
                self.config.max_tokens,
                self.probe.as_mut(),
                log,
            )
            .await;

        let code_execution = match inference.completion() {
            Some(completion) => {
                log.info(format!(
                    "Full Response Content ({}):\n{}",
                    kind.label(),
                    completion.content
                ));
                let identifier = format!("{}_{}", target.model, kind.identifier());
                Some(
                    self.executor
                        .execute(&completion.content, &identifier, log)
                        .await,
                )
            }
            None => None,
        };

        TestResult {
            model: target.model.clone(),
            endpoint: target.url.clone(),
            kind,
            prompt: prompt.to_string(),
            inference,
            code_execution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_perfbench_adapters::StaticMemoryProbe;
    use llm_perfbench_core::{ExecutionStatus, MemorySnapshot};
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer, output_dir: &std::path::Path) -> BenchConfig {
        let mut config = BenchConfig {
            targets: vec![TargetConfig::new(
                format!("{}/v1/chat/completions", server.uri()),
                "org/model:q8",
            )],
            single_turn_prompt: "write code".to_string(),
            multi_turn_prompts: vec![
                "turn one".to_string(),
                "turn two".to_string(),
                "turn three".to_string(),
            ],
            max_tokens: 64,
            ..BenchConfig::default()
        };
        config.execution.output_dir = output_dir.to_path_buf();
        config
    }

    fn runner(config: BenchConfig) -> BenchmarkRunner {
        BenchmarkRunner::new(config)
            .unwrap()
            .with_memory_probe(StaticMemoryProbe(MemorySnapshot {
                percent: 10.0,
                used_gb: 1.0,
            }))
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"completion_tokens": 10}
        }))
    }

    #[tokio::test]
    async fn test_full_run_records_every_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("plain text answer"))
            .expect(4)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let mut runner = runner(test_config(&server, dir.path()));
        let results = runner.run(&mut BenchLog::discard()).await;

        let kinds: Vec<TestKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TestKind::SingleTurn,
                TestKind::MultiTurn { turn: 1 },
                TestKind::MultiTurn { turn: 2 },
                TestKind::MultiTurn { turn: 3 },
            ]
        );
        assert!(results.iter().all(|r| r.success()));
        assert!(results.iter().all(|r| r.code_execution.as_ref().map(|c| &c.status)
            == Some(&ExecutionStatus::NoCodeBlock)));
        assert_eq!(results[2].prompt, "turn two");
    }

    #[tokio::test]
    async fn test_multi_turn_sends_accumulated_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    {"role": "user", "content": "turn one"},
                    {"role": "assistant", "content": "answer"},
                    {"role": "user", "content": "turn two"}
                ]
            })))
            .respond_with(reply("answer"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(reply("answer"))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let mut config = test_config(&server, dir.path());
        config.multi_turn_prompts.truncate(2);
        let mut runner = runner(config);
        let target = runner.config().targets[0].clone();
        let results = runner
            .run_multi_turn(&target, &mut BenchLog::discard())
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success()));
    }

    #[tokio::test]
    async fn test_failed_turn_aborts_remaining_turns() {
        let server = MockServer::start().await;
        // Turn 2 is the only request carrying "turn two"; it fails.
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    {"role": "user", "content": "turn one"},
                    {"role": "assistant", "content": "answer"},
                    {"role": "user", "content": "turn two"}
                ]
            })))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(reply("answer"))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let mut runner = runner(test_config(&server, dir.path()));
        let target = runner.config().targets[0].clone();
        let (mut log, buffer) = BenchLog::in_memory();
        let results = runner.run_multi_turn(&target, &mut log).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].success());
        assert!(!results[1].success());
        assert!(results[1].code_execution.is_none());
        assert!(buffer
            .contents()
            .contains("Multi-turn test failed at turn 2. Aborting multi-turn test."));

        // single-turn request excluded: turn one + failing turn two only
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn test_code_is_persisted_per_model_and_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("Here:\n```python\nprint('hi')\n```"))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let mut config = test_config(&server, dir.path());
        config.multi_turn_prompts.clear();
        let mut runner = runner(config);
        let results = runner.run(&mut BenchLog::discard()).await;

        assert_eq!(results.len(), 1);
        let persisted = dir.path().join("org_model_q8_single_turn.py");
        assert_eq!(std::fs::read_to_string(persisted).unwrap(), "print('hi')");
        assert!(results[0].code_execution.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_target_fails_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BenchConfig {
            targets: vec![TargetConfig::new(
                "http://127.0.0.1:1/v1/chat/completions",
                "offline",
            )],
            ..BenchConfig::default()
        };
        config.execution.output_dir = dir.path().to_path_buf();

        let mut runner = runner(config);
        let results = runner.run(&mut BenchLog::discard()).await;

        // single-turn failure, then multi-turn aborted at turn 1
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.success()));
        assert_eq!(results[1].kind, TestKind::MultiTurn { turn: 1 });
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = BenchConfig {
            targets: Vec::new(),
            ..BenchConfig::default()
        };
        assert!(BenchmarkRunner::new(config).is_err());
    }
}
