// SPDX-License-Identifier: MIT

//! Daemon status snapshot, shared between the server and wire crates.

use serde::{Deserialize, Serialize};

/// A point-in-time view of daemon lifecycle and queue health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    pub running: bool,
    pub pid: u32,
    pub started_at_ms: u64,
    pub jobs_active: usize,
    pub jobs_queued: usize,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub worker_count: usize,
}
