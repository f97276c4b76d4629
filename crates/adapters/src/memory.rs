// Copyright 2025 LLM Perfbench Contributors
// SPDX-License-Identifier: Apache-2.0

//! System memory sampling.
//!
//! The inference client samples memory immediately before and after every
//! request through the [`MemoryProbe`] trait. [`SystemMemoryProbe`] reads the
//! host's memory counters with `sysinfo`; [`StaticMemoryProbe`] always
//! reports the same snapshot and is meant for tests and dry runs.

use llm_perfbench_core::MemorySnapshot;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Source of system memory snapshots.
pub trait MemoryProbe: Send {
    /// Take a fresh snapshot.
    fn sample(&mut self) -> MemorySnapshot;
}

/// Build a snapshot from raw byte counters.
///
/// The percentage counts everything that is not available to new
/// allocations; a zero total yields 0%.
pub fn snapshot_from_bytes(total: u64, available: u64, used: u64) -> MemorySnapshot {
    let percent = if total == 0 {
        0.0
    } else {
        total.saturating_sub(available) as f64 / total as f64 * 100.0
    };
    MemorySnapshot {
        percent,
        used_gb: used as f64 / BYTES_PER_GB,
    }
}

/// Probe backed by the operating system's memory counters.
pub struct SystemMemoryProbe {
    system: System,
}

impl SystemMemoryProbe {
    /// Create a probe that only refreshes memory information.
    pub fn new() -> Self {
        Self {
            system: System::new_with_specifics(
                RefreshKind::new().with_memory(MemoryRefreshKind::everything()),
            ),
        }
    }
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn sample(&mut self) -> MemorySnapshot {
        self.system.refresh_memory();
        snapshot_from_bytes(
            self.system.total_memory(),
            self.system.available_memory(),
            self.system.used_memory(),
        )
    }
}

/// Probe that returns a fixed snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMemoryProbe(pub MemorySnapshot);

impl MemoryProbe for StaticMemoryProbe {
    fn sample(&mut self) -> MemorySnapshot {
        self.0
    }
}
