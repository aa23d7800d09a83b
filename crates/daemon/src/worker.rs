// SPDX-License-Identifier: MIT

//! Worker loop: pulls jobs off the queue, walks them, and reports
//! outcomes back into the queue.

use std::sync::Arc;
use std::time::Duration;

use fman_core::{Clock, Job, JobStatus};
use fman_storage::MetadataStore;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::queue::JobQueue;
use crate::resource_monitor::ResourceMonitor;
use crate::walker::{self, WalkError};

/// How long `JobQueue::next` waits before re-checking for shutdown.
const POLL_TIMEOUT: Duration = Duration::from_millis(500);
/// Maximum automatic retries for a job whose failure is classified
/// retryable.
const MAX_RETRIES: u32 = 2;
/// Base delay before a retry attempt; doubled per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// Substrings in an error's `Display` output that mark it as transient
/// and worth an automatic retry (contention, not a fundamentally broken
/// root path).
const RETRYABLE_MESSAGE_SUBSTRINGS: &[&str] =
    &["database is locked", "resource temporarily unavailable", "too many open files"];

fn is_retryable(message: &str) -> bool {
    let lower = message.to_lowercase();
    RETRYABLE_MESSAGE_SUBSTRINGS.iter().any(|needle| lower.contains(needle))
}

/// Lifetime counters for one worker, snapshotted into status responses.
#[derive(Debug, Clone, Default)]
pub struct WorkerCounters {
    pub jobs_processed: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub total_runtime_ms: u64,
    pub last_job_at_ms: Option<u64>,
}

/// Runs the pull-process-report loop for one worker slot until `token`
/// is cancelled.
pub struct Worker<C: Clock> {
    pub id: usize,
    queue: Arc<JobQueue>,
    store: Arc<dyn MetadataStore + Send + Sync>,
    monitor: Arc<ResourceMonitor>,
    clock: C,
    progress_tx: mpsc::Sender<(fman_core::JobId, fman_core::ScanProgress)>,
    counters: std::sync::Mutex<WorkerCounters>,
}

impl<C: Clock> Worker<C> {
    pub fn new(
        id: usize,
        queue: Arc<JobQueue>,
        store: Arc<dyn MetadataStore + Send + Sync>,
        monitor: Arc<ResourceMonitor>,
        clock: C,
        progress_tx: mpsc::Sender<(fman_core::JobId, fman_core::ScanProgress)>,
    ) -> Self {
        Self { id, queue, store, monitor, clock, progress_tx, counters: std::sync::Mutex::new(WorkerCounters::default()) }
    }

    pub fn counters(&self) -> WorkerCounters {
        self.counters.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Pull jobs until `token` fires. Each iteration waits on the
    /// resource monitor's throttle flag before asking the queue for
    /// the next job.
    pub async fn run(&self, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                return;
            }
            self.monitor.wait_if_throttling(&token).await;

            let now = self.clock.now_ms();
            match self.queue.next(&token, POLL_TIMEOUT, now).await {
                Ok(Some(job)) => self.process(job, &token).await,
                Ok(None) => continue,
                Err(_) => return,
            }
        }
    }

    /// Run one job to completion (success, failure, or cancellation),
    /// retrying transient failures up to [`MAX_RETRIES`] times, and
    /// write the outcome back into the queue.
    async fn process(&self, mut job: Job, token: &CancellationToken) {
        let job_id = job.id;
        let job_token = token.child_token();
        let watch_queue = self.queue.clone();
        let watch_token = job_token.clone();
        let watcher = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(100)).await;
                if watch_token.is_cancelled() {
                    return;
                }
                if let Ok(current) = watch_queue.get(job_id) {
                    if current.status == JobStatus::Cancelled {
                        watch_token.cancel();
                        return;
                    }
                } else {
                    return;
                }
            }
        });

        let start = self.clock.now_ms();
        let mut attempt: u32 = 0;
        let outcome = loop {
            let progress_tx = self.progress_tx.clone();
            let result = walker::scan(&job_token, &job.path, &job.options, self.store.as_ref(), {
                let tx = progress_tx.clone();
                move |p: fman_core::ScanProgress| {
                    let _ = tx.try_send((job_id, p));
                }
            })
            .await;

            match result {
                Ok(stats) => break Ok(stats),
                Err(WalkError::Cancelled) => break Err(CancelledOrFailed::Cancelled),
                Err(e) => {
                    let message = e.to_string();
                    if attempt < MAX_RETRIES && is_retryable(&message) {
                        attempt += 1;
                        warn!(job = %job_id, attempt, error = %message, "retrying job after transient error");
                        tokio::time::sleep(RETRY_BASE_DELAY * attempt).await;
                        continue;
                    }
                    break Err(CancelledOrFailed::Failed(message));
                }
            }
        };

        job_token.cancel();
        let _ = watcher.await;

        let now = self.clock.now_ms();
        match outcome {
            Ok(stats) => {
                job.stats = stats;
                job.status = JobStatus::Completed;
                info!(job = %job_id, files = job.stats.files_indexed, "scan completed");
                self.record_outcome(true, start, now);
            }
            Err(CancelledOrFailed::Cancelled) => {
                job.status = JobStatus::Cancelled;
                debug!(job = %job_id, "scan cancelled");
            }
            Err(CancelledOrFailed::Failed(message)) => {
                job.error = Some(message.clone());
                job.status = JobStatus::Failed;
                warn!(job = %job_id, error = %message, "scan failed");
                self.record_outcome(false, start, now);
            }
        }
        job.completed_at_ms = Some(now);

        if let Err(e) = self.queue.update(job, now) {
            warn!(job = %job_id, error = %e, "failed to record job outcome in queue");
        }
    }

    fn record_outcome(&self, succeeded: bool, start_ms: u64, end_ms: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.jobs_processed += 1;
        if succeeded {
            counters.jobs_succeeded += 1;
        } else {
            counters.jobs_failed += 1;
        }
        counters.total_runtime_ms += end_ms.saturating_sub(start_ms);
        counters.last_job_at_ms = Some(end_ms);
    }
}

enum CancelledOrFailed {
    Cancelled,
    Failed(String),
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
