// SPDX-License-Identifier: MIT

//! The Unix-socket server: accepts connections, dispatches requests
//! against the job queue, and owns the worker pool's lifetime.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fman_core::{Clock, DaemonStatus, Job, JobId, JobStatus, SystemClock};
use fman_storage::MetadataStore;
use fman_wire::{write_envelope, Envelope, MessageReader, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::path_normalizer::PathNormalizer;
use crate::queue::{JobQueue, QueueError};
use crate::resource_monitor::ResourceMonitor;
use crate::worker::Worker;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("daemon is already running")]
    AlreadyRunning,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] fman_storage::StoreError),
}

/// Shared context every connection handler dispatches requests against.
struct ServerCtx<C: Clock> {
    queue: Arc<JobQueue>,
    normalizer: PathNormalizer,
    clock: C,
    started_at_ms: u64,
    worker_count: usize,
    shutting_down: AtomicBool,
}

/// Handle returned by [`Server::start`]: cancel `token` or call `stop`
/// to begin a graceful shutdown, then `await` `join` to wait for it.
pub struct ServerHandle {
    token: CancellationToken,
    accept_task: tokio::task::JoinHandle<()>,
    worker_tasks: Vec<tokio::task::JoinHandle<()>>,
    monitor_task: tokio::task::JoinHandle<()>,
    socket_path: PathBuf,
    pid_path: PathBuf,
}

impl ServerHandle {
    /// A clone of the token driving this server's shutdown. It is
    /// cancelled either by a `Shutdown` request arriving over the
    /// socket or by the caller; await it to learn when to call `stop`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel all tasks and wait for them to wind down, then remove the
    /// socket and PID files.
    pub async fn stop(self) {
        self.token.cancel();
        let _ = self.accept_task.await;
        for task in self.worker_tasks {
            let _ = task.await;
        }
        let _ = self.monitor_task.await;
        let _ = std::fs::remove_file(&self.socket_path);
        let _ = std::fs::remove_file(&self.pid_path);
    }
}

pub struct Server;

impl Server {
    /// Bring up a fresh daemon instance bound to `config.socket_path`:
    /// refuses to start if a daemon is already live, creates the socket
    /// directory, removes a stale socket, binds, tightens permissions,
    /// writes the PID file, and spawns the worker pool and resource
    /// monitor before accepting connections.
    pub async fn start(
        config: Config,
        store: Arc<dyn MetadataStore + Send + Sync>,
    ) -> Result<ServerHandle, ServerError> {
        if fman_core::lifecycle::is_running(&config.pid_path) {
            return Err(ServerError::AlreadyRunning);
        }

        if let Some(parent) = config.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
            set_mode(parent, 0o755)?;
        }
        if config.socket_path.exists() {
            std::fs::remove_file(&config.socket_path)?;
        }

        let listener = UnixListener::bind(&config.socket_path)?;
        set_mode(&config.socket_path, 0o600)?;

        std::fs::write(&config.pid_path, std::process::id().to_string())?;
        set_mode(&config.pid_path, 0o644)?;

        store.init()?;

        let token = CancellationToken::new();
        let queue = Arc::new(JobQueue::new(config.queue_size, crate::queue::DEFAULT_MAX_HISTORY));
        let monitor = Arc::new(ResourceMonitor::new(crate::resource_monitor::ResourceLimits::default()));
        let clock = SystemClock;
        let started_at_ms = clock.now_ms();
        let ctx = Arc::new(ServerCtx {
            queue: queue.clone(),
            normalizer: PathNormalizer::new(),
            clock,
            started_at_ms,
            worker_count: config.max_workers,
            shutting_down: AtomicBool::new(false),
        });

        let (progress_tx, mut progress_rx) = mpsc::channel::<(JobId, fman_core::ScanProgress)>(256);
        tokio::spawn(async move {
            while let Some((job_id, progress)) = progress_rx.recv().await {
                debug!(job = %job_id, files = progress.files_processed, "scan progress");
            }
        });

        let mut worker_tasks = Vec::with_capacity(config.max_workers);
        for id in 0..config.max_workers {
            let worker = Worker::new(
                id,
                queue.clone(),
                store.clone(),
                monitor.clone(),
                SystemClock,
                progress_tx.clone(),
            );
            let worker_token = token.clone();
            worker_tasks.push(tokio::spawn(async move {
                worker.run(worker_token).await;
            }));
        }

        let monitor_token = token.clone();
        let monitor_for_loop = monitor.clone();
        let queue_for_monitor = queue.clone();
        let monitor_task = tokio::spawn(async move {
            monitor_for_loop
                .run(move || queue_for_monitor.stats().running, monitor_token)
                .await;
        });

        let accept_token = token.clone();
        let accept_ctx = ctx.clone();
        let accept_task = tokio::spawn(async move {
            accept_loop(listener, accept_ctx, accept_token).await;
        });

        info!(socket = %config.socket_path.display(), workers = config.max_workers, "daemon started");

        Ok(ServerHandle {
            token,
            accept_task,
            worker_tasks,
            monitor_task,
            socket_path: config.socket_path,
            pid_path: config.pid_path,
        })
    }
}

async fn accept_loop<C: Clock>(listener: UnixListener, ctx: Arc<ServerCtx<C>>, token: CancellationToken) {
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let ctx = ctx.clone();
                        let conn_token = token.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &ctx, conn_token).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "accept error"),
                }
            }
        }
    }
}

fn request_kind(request: &Request) -> &'static str {
    match request {
        Request::Scan { .. } => "scan",
        Request::Status => "status",
        Request::JobStatus(_) => "job_status",
        Request::JobList(_) => "job_list",
        Request::JobCancel(_) => "job_cancel",
        Request::QueueClear => "queue_clear",
        Request::Shutdown => "shutdown",
    }
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::Eof => debug!("client disconnected"),
        other => warn!(error = %other, "connection error"),
    }
}

/// Read envelopes from one connection until EOF, racing each
/// request-handling future against cancellation so a slow handler
/// doesn't outlive a stopped daemon.
async fn handle_connection<C: Clock>(
    stream: UnixStream,
    ctx: &ServerCtx<C>,
    token: CancellationToken,
) -> Result<(), ProtocolError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = MessageReader::new(read_half);

    loop {
        let envelope = tokio::select! {
            result = reader.read_envelope() => result?,
            _ = token.cancelled() => return Ok(()),
        };

        let Some(request) = envelope.request else {
            continue;
        };
        debug!(id = %envelope.id, kind = request_kind(&request), "dispatching request");
        let response = dispatch(ctx, request, &token).await;
        debug!(id = %envelope.id, success = response.success, "request handled");
        let out = Envelope::for_response(envelope.id, ctx.clock.now_ms(), response);
        write_envelope(&mut write_half, &out).await?;
    }
}

/// Route one request to its handler, mapping every outcome to a
/// [`Response`] — handler-level failures never abort the connection.
async fn dispatch<C: Clock>(ctx: &ServerCtx<C>, request: Request, token: &CancellationToken) -> Response {
    match request {
        Request::Scan { path, options } => handle_scan(ctx, path, options),
        Request::Status => handle_status(ctx),
        Request::JobStatus(id) => handle_job_status(ctx, &id),
        Request::JobList(filter) => handle_job_list(ctx, filter),
        Request::JobCancel(id) => handle_job_cancel(ctx, &id),
        Request::QueueClear => {
            ctx.queue.clear();
            Response::ok_empty()
        }
        Request::Shutdown => {
            ctx.shutting_down.store(true, Ordering::SeqCst);
            token.cancel();
            Response::ok_empty()
        }
    }
}

/// Normalize `path`, check it against every pending/running job's
/// normalized path for duplicate/ancestor conflicts, and admit it.
fn handle_scan<C: Clock>(ctx: &ServerCtx<C>, path: PathBuf, options: fman_core::ScanOptions) -> Response {
    let existing: Vec<PathBuf> =
        ctx.queue.list(Some(JobStatus::Pending)).into_iter().chain(ctx.queue.list(Some(JobStatus::Running))).map(|j| j.path).collect();

    if let Some(conflict) = ctx.normalizer.has_conflict(&path, &existing) {
        return Response::error(format!("path conflict ({conflict}): {}", path.display()));
    }

    let now = ctx.clock.now_ms();
    let job = Job::new(path, options, now);
    match ctx.queue.add(job, now) {
        Ok(job) => match Response::ok(&job) {
            Ok(response) => response,
            Err(e) => Response::error(e.to_string()),
        },
        Err(QueueError::Full) => Response::error("queue is full"),
        Err(QueueError::DuplicatePath(p)) => Response::error(format!("duplicate path: {}", p.display())),
        Err(e) => Response::error(e.to_string()),
    }
}

fn handle_status<C: Clock>(ctx: &ServerCtx<C>) -> Response {
    let stats = ctx.queue.stats();
    let status = DaemonStatus {
        running: true,
        pid: std::process::id(),
        started_at_ms: ctx.started_at_ms,
        jobs_active: stats.running,
        jobs_queued: stats.pending,
        jobs_completed: stats.total_completed,
        jobs_failed: stats.total_failed,
        worker_count: ctx.worker_count,
    };
    Response::ok(&status).unwrap_or_else(|e| Response::error(e.to_string()))
}

fn handle_job_status<C: Clock>(ctx: &ServerCtx<C>, id: &str) -> Response {
    let job_id = JobId::from_string(id);
    match ctx.queue.get(job_id) {
        Ok(job) => Response::ok(&job).unwrap_or_else(|e| Response::error(e.to_string())),
        Err(e) => Response::error(e.to_string()),
    }
}

fn handle_job_list<C: Clock>(ctx: &ServerCtx<C>, filter: Option<String>) -> Response {
    let status = match filter.as_deref() {
        None | Some("") => None,
        Some(s) => match parse_status(s) {
            Some(status) => Some(status),
            None => return Response::error(format!("unknown job status: {s}")),
        },
    };
    let jobs = ctx.queue.list(status);
    Response::ok(&jobs).unwrap_or_else(|e| Response::error(e.to_string()))
}

fn handle_job_cancel<C: Clock>(ctx: &ServerCtx<C>, id: &str) -> Response {
    let job_id = JobId::from_string(id);
    let now = ctx.clock.now_ms();
    match ctx.queue.cancel(job_id, now) {
        Ok(()) => Response::ok_empty(),
        Err(e) => Response::error(e.to_string()),
    }
}

fn parse_status(s: &str) -> Option<JobStatus> {
    match s {
        "pending" => Some(JobStatus::Pending),
        "running" => Some(JobStatus::Running),
        "completed" => Some(JobStatus::Completed),
        "failed" => Some(JobStatus::Failed),
        "cancelled" => Some(JobStatus::Cancelled),
        _ => None,
    }
}

#[cfg(unix)]
fn set_mode(path: &std::path::Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &std::path::Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
