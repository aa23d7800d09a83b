// SPDX-License-Identifier: MIT

//! The in-memory job queue: pending FIFO, running set, and bounded
//! per-outcome history.

use std::collections::{HashMap, VecDeque};

use fman_core::{Job, JobId, JobStatus};
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Default cap on each history bucket (completed/failed/cancelled).
pub const DEFAULT_MAX_HISTORY: usize = 1000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is full")]
    Full,
    #[error("duplicate path: {0}")]
    DuplicatePath(std::path::PathBuf),
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("job {0} is not in a cancellable state")]
    IllegalTransition(JobId),
    #[error("operation cancelled")]
    Cancelled,
}

/// Instantaneous and lifetime queue counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub total_added: u64,
    pub total_completed: u64,
    pub total_failed: u64,
    pub total_cancelled: u64,
}

struct State {
    pending: VecDeque<Job>,
    running: HashMap<JobId, Job>,
    completed: VecDeque<Job>,
    failed: VecDeque<Job>,
    cancelled: VecDeque<Job>,
    total_added: u64,
    total_completed: u64,
    total_failed: u64,
    total_cancelled: u64,
}

impl State {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            running: HashMap::new(),
            completed: VecDeque::new(),
            failed: VecDeque::new(),
            cancelled: VecDeque::new(),
            total_added: 0,
            total_completed: 0,
            total_failed: 0,
            total_cancelled: 0,
        }
    }

    fn path_in_flight(&self, path: &std::path::Path) -> bool {
        self.pending.iter().any(|j| j.path == path) || self.running.values().any(|j| j.path == path)
    }

    fn history_bucket_mut(&mut self, status: JobStatus) -> Option<&mut VecDeque<Job>> {
        match status {
            JobStatus::Completed => Some(&mut self.completed),
            JobStatus::Failed => Some(&mut self.failed),
            JobStatus::Cancelled => Some(&mut self.cancelled),
            _ => None,
        }
    }
}

/// Thread-safe FIFO job queue with deduplication by raw path and bounded
/// per-outcome history. Guarded by a reader/writer lock; dequeuers wait
/// on a single-slot notification.
pub struct JobQueue {
    state: RwLock<State>,
    notify: Notify,
    max_queue_size: usize,
    max_history: usize,
}

impl JobQueue {
    pub fn new(max_queue_size: usize, max_history: usize) -> Self {
        Self { state: RwLock::new(State::new()), notify: Notify::new(), max_queue_size, max_history }
    }

    /// Admit `job`, stamping it pending with `now_ms`.
    ///
    /// Rejected if the pending list is already at `max_queue_size`, or if
    /// `job.path` (raw, not normalized — that's the server's job) matches
    /// any pending or running job's path.
    pub fn add(&self, mut job: Job, now_ms: u64) -> Result<Job, QueueError> {
        let mut state = self.state.write();
        if state.pending.len() >= self.max_queue_size {
            return Err(QueueError::Full);
        }
        if state.path_in_flight(&job.path) {
            return Err(QueueError::DuplicatePath(job.path));
        }
        job.status = JobStatus::Pending;
        job.created_at_ms = now_ms;
        state.total_added += 1;
        state.pending.push_back(job.clone());
        drop(state);
        self.notify.notify_one();
        Ok(job)
    }

    /// Block until a pending job is available, `token` is cancelled, or
    /// `timeout` elapses (returning `Ok(None)` on timeout so callers can
    /// re-check their own cancellation/throttle state).
    pub async fn next(
        &self,
        token: &CancellationToken,
        timeout: std::time::Duration,
        now_ms: u64,
    ) -> Result<Option<Job>, QueueError> {
        loop {
            if let Some(job) = self.try_pop(now_ms) {
                return Ok(Some(job));
            }
            tokio::select! {
                _ = self.notify.notified() => continue,
                _ = token.cancelled() => return Err(QueueError::Cancelled),
                _ = tokio::time::sleep(timeout) => return Ok(None),
            }
        }
    }

    fn try_pop(&self, now_ms: u64) -> Option<Job> {
        let mut state = self.state.write();
        let mut job = state.pending.pop_front()?;
        job.status = JobStatus::Running;
        job.started_at_ms = Some(now_ms);
        state.running.insert(job.id, job.clone());
        Some(job)
    }

    /// A defensive copy of the job with `id`, searched across pending,
    /// running, and all history buckets.
    pub fn get(&self, id: JobId) -> Result<Job, QueueError> {
        let state = self.state.read();
        state
            .pending
            .iter()
            .find(|j| j.id == id)
            .or_else(|| state.running.get(&id))
            .or_else(|| state.completed.iter().find(|j| j.id == id))
            .or_else(|| state.failed.iter().find(|j| j.id == id))
            .or_else(|| state.cancelled.iter().find(|j| j.id == id))
            .cloned()
            .ok_or(QueueError::NotFound(id))
    }

    /// All jobs, optionally filtered by status (`None` = all), newest
    /// history first within each bucket, running before pending.
    pub fn list(&self, filter: Option<JobStatus>) -> Vec<Job> {
        let state = self.state.read();
        let mut jobs = Vec::new();
        let include = |status: JobStatus| match filter {
            None => true,
            Some(f) => f == status,
        };

        if include(JobStatus::Running) {
            jobs.extend(state.running.values().cloned());
        }
        if include(JobStatus::Pending) {
            jobs.extend(state.pending.iter().cloned());
        }
        if include(JobStatus::Completed) {
            jobs.extend(state.completed.iter().cloned());
        }
        if include(JobStatus::Failed) {
            jobs.extend(state.failed.iter().cloned());
        }
        if include(JobStatus::Cancelled) {
            jobs.extend(state.cancelled.iter().cloned());
        }
        jobs
    }

    /// Patch the stored job matching `updated.id`'s status, stats,
    /// error, and progress. Terminal transitions move the job out of
    /// running/pending and into the matching history bucket, trimming
    /// it to `max_history`. Re-updating an already-terminal job
    /// reassigns the same bucket (idempotent).
    pub fn update(&self, updated: Job, now_ms: u64) -> Result<(), QueueError> {
        let mut state = self.state.write();
        let id = updated.id;

        let was_terminal = state.completed.iter().any(|j| j.id == id)
            || state.failed.iter().any(|j| j.id == id)
            || state.cancelled.iter().any(|j| j.id == id);

        if let Some(pos) = state.pending.iter().position(|j| j.id == id) {
            state.pending.remove(pos);
        }
        state.running.remove(&id);
        for bucket in [&mut state.completed, &mut state.failed, &mut state.cancelled] {
            bucket.retain(|j| j.id != id);
        }

        let mut job = updated;
        if job.is_terminal() {
            if job.completed_at_ms.is_none() {
                job.completed_at_ms = Some(now_ms);
            }
            if !was_terminal {
                match job.status {
                    JobStatus::Completed => state.total_completed += 1,
                    JobStatus::Failed => state.total_failed += 1,
                    JobStatus::Cancelled => state.total_cancelled += 1,
                    _ => {}
                }
            }
            let max_history = self.max_history;
            if let Some(bucket) = state.history_bucket_mut(job.status) {
                bucket.push_back(job);
                while bucket.len() > max_history {
                    bucket.pop_front();
                }
            }
        } else {
            match job.status {
                JobStatus::Running => {
                    state.running.insert(id, job);
                }
                JobStatus::Pending => {
                    state.pending.push_back(job);
                }
                _ => unreachable!("non-terminal status is always Pending or Running"),
            }
        }
        Ok(())
    }

    /// Cancel a pending or running job: sets status/completed_at, moves
    /// it to the cancelled history bucket. `NotFound` if absent,
    /// `IllegalTransition` if already terminal.
    pub fn cancel(&self, id: JobId, now_ms: u64) -> Result<(), QueueError> {
        let mut state = self.state.write();

        if let Some(pos) = state.pending.iter().position(|j| j.id == id) {
            if let Some(mut job) = state.pending.remove(pos) {
                job.status = JobStatus::Cancelled;
                job.completed_at_ms = Some(now_ms);
                state.total_cancelled += 1;
                state.cancelled.push_back(job);
                trim(&mut state.cancelled, self.max_history);
            }
            return Ok(());
        }
        if let Some(mut job) = state.running.remove(&id) {
            job.status = JobStatus::Cancelled;
            job.completed_at_ms = Some(now_ms);
            state.total_cancelled += 1;
            state.cancelled.push_back(job);
            trim(&mut state.cancelled, self.max_history);
            return Ok(());
        }
        let already_terminal = state.completed.iter().any(|j| j.id == id)
            || state.failed.iter().any(|j| j.id == id)
            || state.cancelled.iter().any(|j| j.id == id);
        if already_terminal {
            Err(QueueError::IllegalTransition(id))
        } else {
            Err(QueueError::NotFound(id))
        }
    }

    /// Remove every pending job. Running jobs and history are untouched.
    pub fn clear(&self) {
        self.state.write().pending.clear();
    }

    pub fn size(&self) -> usize {
        self.state.read().pending.len()
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.read();
        QueueStats {
            pending: state.pending.len(),
            running: state.running.len(),
            completed: state.completed.len(),
            failed: state.failed.len(),
            cancelled: state.cancelled.len(),
            total_added: state.total_added,
            total_completed: state.total_completed,
            total_failed: state.total_failed,
            total_cancelled: state.total_cancelled,
        }
    }
}

fn trim(bucket: &mut VecDeque<Job>, max_history: usize) {
    while bucket.len() > max_history {
        bucket.pop_front();
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
