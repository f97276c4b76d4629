// Copyright 2025 LLM Perfbench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Append-only benchmark log.
//!
//! [`BenchLog`] is constructed once by the caller and passed down by mutable
//! reference to every component that records requests, responses and
//! execution outcomes. Each record is written as one timestamped text line
//! (continuation lines for multi-line messages follow verbatim) and mirrored
//! as a `tracing` event under the `perfbench::log` target. Mirrored events
//! stay below `WARN`, so the default console filter only shows the summary.
//!
//! ```text
//! 2025-05-02 14:03:11,482 - INFO - Sending request payload: {...}
//! ```

use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Normal progress
    Info,
    /// Recoverable problem
    Warn,
    /// Failed operation
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

/// Cloneable in-memory buffer that captures everything written to a
/// [`BenchLog`] created with [`BenchLog::in_memory`].
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Contents written so far, lossily decoded.
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Explicit, passed-down log sink.
pub struct BenchLog {
    writer: Box<dyn Write + Send>,
    failed: bool,
}

impl std::fmt::Debug for BenchLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchLog")
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl BenchLog {
    /// Wrap an arbitrary writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            failed: false,
        }
    }

    /// Open `path` in append mode, creating it if needed.
    pub fn open_append(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }

    /// Log backed by a shared in-memory buffer.
    pub fn in_memory() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(buffer.clone()), buffer)
    }

    /// Log that discards every record (tracing mirroring still applies).
    pub fn discard() -> Self {
        Self::new(io::sink())
    }

    /// Record an informational message.
    pub fn info(&mut self, message: impl AsRef<str>) {
        self.record(Level::Info, message.as_ref());
    }

    /// Record a warning.
    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.record(Level::Warn, message.as_ref());
    }

    /// Record an error.
    pub fn error(&mut self, message: impl AsRef<str>) {
        self.record(Level::Error, message.as_ref());
    }

    /// Record each line as its own informational record.
    pub fn info_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        for line in lines {
            self.info(line);
        }
    }

    /// Record a message at the given level.
    pub fn record(&mut self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::debug!(target: "perfbench::log", "{}", message),
            Level::Warn | Level::Error => {
                tracing::info!(target: "perfbench::log", severity = level.as_str(), "{}", message)
            }
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        let written = writeln!(self.writer, "{} - {} - {}", timestamp, level.as_str(), message)
            .and_then(|_| self.writer.flush());

        // Report the first write failure only; the run must go on without a log.
        if let Err(e) = written {
            if !self.failed {
                tracing::warn!(error = %e, "Writing to the benchmark log failed");
                self.failed = true;
            }
        }
    }

    /// Whether any write to the underlying writer has failed.
    pub fn has_failed(&self) -> bool {
        self.failed
    }
}
