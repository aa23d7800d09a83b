// SPDX-License-Identifier: MIT

//! Job identifier, scan options, statistics, and the job state machine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

crate::define_id! {
    /// Unique identifier for a scan job, valid for the daemon's lifetime.
    pub struct JobId("job-");
}

/// Literal hash stored for files that exceed `max_hash_file_size`.
pub const SENTINEL_HASH: &str = "large_file_skipped";

/// Status of a job within the queue's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Options controlling how a scan job walks and hashes a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Record skipped-path diagnostics and keep them in [`ScanStatistics`].
    #[serde(default)]
    pub verbose: bool,
    /// Hint consumed by the CLI glue before the core is entered; the core
    /// never acts on it directly.
    #[serde(default)]
    pub force_sudo: bool,
    /// Cooperative pause inserted every 100th file processed.
    #[serde(default, with = "duration_nanos")]
    pub throttle_delay: Duration,
    /// Files strictly larger than this (in bytes) are not hashed; `0` disables the cap.
    #[serde(default)]
    pub max_hash_file_size: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            force_sudo: false,
            throttle_delay: Duration::ZERO,
            max_hash_file_size: 0,
        }
    }
}

mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_nanos() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let nanos = u64::deserialize(d)?;
        Ok(Duration::from_nanos(nanos))
    }
}

/// Monotonic counters and (verbose-only) diagnostics accrued during a walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStatistics {
    pub files_indexed: u64,
    pub directories_skipped: u64,
    pub permission_errors: u64,
    /// Paths skipped due to the traversal filter or a permission error.
    /// Only populated when `ScanOptions::verbose` is set; bounded to avoid
    /// unbounded memory growth on pathological trees.
    #[serde(default)]
    pub skipped_paths: Vec<PathBuf>,
}

/// Cap on `ScanStatistics::skipped_paths` even in verbose mode.
pub const MAX_SKIPPED_PATHS: usize = 1000;

impl ScanStatistics {
    pub fn record_skip(&mut self, verbose: bool, path: PathBuf) {
        if verbose && self.skipped_paths.len() < MAX_SKIPPED_PATHS {
            self.skipped_paths.push(path);
        }
    }
}

/// A snapshot of in-progress walk state, published by the worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanProgress {
    pub files_processed: u64,
    pub current_path: Option<PathBuf>,
}

/// One unit of work: scan a specific root path, plus metadata accrued
/// across its lifecycle.
///
/// Invariants (enforced by the Job Queue, not by this type): a job is in
/// exactly one of the queue's pending list, running set, or history
/// buckets; a terminal status implies `completed_at_ms` is set;
/// `started_at_ms` precedes `completed_at_ms` when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub path: PathBuf,
    pub options: ScanOptions,
    pub status: JobStatus,
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
    pub stats: ScanStatistics,
    pub error: Option<String>,
    pub progress: ScanProgress,
}

impl Job {
    pub fn new(path: PathBuf, options: ScanOptions, created_at_ms: u64) -> Self {
        Self {
            id: JobId::new(),
            path,
            options,
            status: JobStatus::Pending,
            created_at_ms,
            started_at_ms: None,
            completed_at_ms: None,
            stats: ScanStatistics::default(),
            error: None,
            progress: ScanProgress::default(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
