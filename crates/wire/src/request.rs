// SPDX-License-Identifier: MIT

use fman_core::ScanOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A typed request from a client to the daemon.
///
/// Serializes as `{"type": "...", "data": ...}`; `data` is absent for
/// variants with no payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Request {
    /// Enqueue a scan of `path` with the given options.
    Scan { path: PathBuf, options: ScanOptions },
    /// Aggregate daemon/queue status.
    Status,
    /// Fetch a single job by id.
    JobStatus(String),
    /// List jobs, optionally filtered by status (`""` = all).
    JobList(#[serde(default)] Option<String>),
    /// Cancel a pending or running job.
    JobCancel(String),
    /// Drop all pending jobs.
    QueueClear,
    /// Request graceful daemon shutdown.
    Shutdown,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
