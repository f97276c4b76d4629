//! CLI for LLM Perfbench.
//!
//! Running `perfbench` with no arguments benchmarks every configured target
//! with the built-in defaults, prints the summary and exits 0. Per-turn
//! failures never change the exit status; only unusable configuration does.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use llm_perfbench_benchmarks::{publish, run_benchmark, BenchmarkRunner};
use llm_perfbench_core::{BenchConfig, BenchLog};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// LLM Perfbench CLI.
#[derive(Parser, Debug)]
#[command(name = "perfbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: run).
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true, env = "PERFBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show progress diagnostics on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Benchmark every configured target and print the summary.
    ///
    /// The summary is also appended to the log file, together with every
    /// request payload, response and code execution outcome.
    Run {
        /// Also write results.json and summary.md into this directory.
        #[arg(short, long)]
        report_dir: Option<PathBuf>,

        /// Print per-turn details after the summary.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Print the resolved configuration as TOML.
    Config,
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` once the benchmark has reported, or an error if the
/// configuration cannot be used.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Run {
        report_dir: None,
        detailed: false,
    });

    match command {
        Commands::Run {
            report_dir,
            detailed,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if report_dir.is_some() {
                config.report.dir = report_dir;
            }
            if detailed {
                config.report.detailed_console = true;
            }
            run_configured(config).await
        }
        Commands::Config => {
            let config = load_config(cli.config.as_deref())?;
            print!(
                "{}",
                toml::to_string_pretty(&config).context("failed to render configuration")?
            );
            Ok(())
        }
    }
}

/// Benchmark with an already resolved configuration.
pub async fn run_configured(config: BenchConfig) -> anyhow::Result<()> {
    let mut log = match BenchLog::open_append(&config.log_file) {
        Ok(log) => log,
        Err(e) => {
            tracing::warn!(
                path = %config.log_file.display(),
                error = %e,
                "Cannot open log file, continuing without it"
            );
            BenchLog::discard()
        }
    };

    let mut runner =
        BenchmarkRunner::new(config.clone()).context("failed to prepare benchmark")?;
    tracing::info!(targets = config.targets.len(), "Starting benchmark");

    let report = run_benchmark(&mut runner, &mut log).await;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    publish(&report, &config.report, &mut log, &mut out);
    warn_if_log_incomplete(&log, &config.log_file);
    Ok(())
}

/// Warn on stderr when records were lost because the log became unwritable.
fn warn_if_log_incomplete(log: &BenchLog, path: &Path) -> bool {
    if log.has_failed() {
        tracing::warn!(
            path = %path.display(),
            "Benchmark log is incomplete: writing to it failed during the run"
        );
    }
    log.has_failed()
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BenchConfig> {
    BenchConfig::load(path).with_context(|| match path {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to load configuration".to_string(),
    })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_means_default_run() {
        let cli = Cli::try_parse_from(["perfbench"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "perfbench",
            "run",
            "--report-dir",
            "out",
            "--detailed",
            "--config",
            "bench.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("bench.toml")));
        match cli.command {
            Some(Commands::Run {
                report_dir,
                detailed,
            }) => {
                assert_eq!(report_dir, Some(PathBuf::from("out")));
                assert!(detailed);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_command() {
        let cli = Cli::try_parse_from(["perfbench", "config", "-v"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config)));
        assert!(cli.verbose);
    }

    struct FullDisk;

    impl std::io::Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_incomplete_log_is_reported() {
        let path = Path::new("performance_test.log");
        let mut log = BenchLog::new(FullDisk);
        assert!(!warn_if_log_incomplete(&log, path));

        log.info("=== PERFORMANCE TEST RUN SUMMARY END ===");
        assert!(warn_if_log_incomplete(&log, path));
    }

    #[test]
    fn test_default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&BenchConfig::default()).unwrap();
        assert!(rendered.contains("max_tokens = 5000"));
        assert!(rendered.contains("[[targets]]"));
    }
}
