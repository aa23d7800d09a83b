// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::time::Duration;

use fman_core::{JobId, ScanOptions};
use fman_wire::{write_envelope, Envelope, EnvelopeKind, MessageReader, Request, Response};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Ceiling on the exponential backoff between connect attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(1);
/// Total time budget for auto-starting and connecting to the daemon.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Env var that shrinks timeouts and disables auto-start, for tests that
/// want to assert on a dead daemon without actually waiting.
const TEST_MODE_ENV: &str = "FMAN_CLIENT_TEST_MODE";

/// Tunables for [`DaemonClient::connect`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
    /// Spawn the daemon in the background if it isn't already running.
    pub auto_start: bool,
    /// Total time budget for connecting (including any auto-start wait).
    pub connect_timeout: Duration,
    /// Executable used to auto-start the daemon (defaults to the
    /// current executable, assuming a combined CLI/daemon binary).
    pub daemon_binary: Option<PathBuf>,
}

impl ClientOptions {
    /// Defaults rooted at `<home>/.fman/{daemon.sock,daemon.pid}`.
    pub fn from_home(home: &std::path::Path) -> Self {
        let fman_dir = home.join(".fman");
        let test_mode = std::env::var(TEST_MODE_ENV).is_ok();
        Self {
            socket_path: fman_dir.join("daemon.sock"),
            pid_path: fman_dir.join("daemon.pid"),
            auto_start: !test_mode,
            connect_timeout: if test_mode { Duration::from_millis(100) } else { DEFAULT_CONNECT_TIMEOUT },
            daemon_binary: None,
        }
    }

    pub fn load() -> Result<Self, ClientError> {
        let home = dirs::home_dir().ok_or(ClientError::NoHomeDir)?;
        Ok(Self::from_home(&home))
    }
}

/// A connected session with the daemon. Requests are sent and responses
/// read over one long-lived Unix socket connection.
pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    /// Connect to the daemon, auto-starting it (if `options.auto_start`)
    /// and retrying with capped exponential backoff until
    /// `options.connect_timeout` elapses.
    pub async fn connect(options: &ClientOptions) -> Result<Self, ClientError> {
        if let Ok(stream) = UnixStream::connect(&options.socket_path).await {
            return Ok(Self { stream });
        }

        if options.auto_start {
            Self::spawn_daemon(options)?;
        }

        let deadline = tokio::time::Instant::now() + options.connect_timeout;
        let mut backoff = Duration::from_millis(20);
        loop {
            match UnixStream::connect(&options.socket_path).await {
                Ok(stream) => return Ok(Self { stream }),
                Err(e) => {
                    if tokio::time::Instant::now() >= deadline {
                        debug!(error = %e, "giving up on connecting to the daemon");
                        return Err(ClientError::ConnectTimeout);
                    }
                    sleep(backoff.min(MAX_BACKOFF)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    fn spawn_daemon(options: &ClientOptions) -> Result<(), ClientError> {
        if fman_core::lifecycle::is_running(&options.pid_path) {
            return Ok(());
        }
        let program = match &options.daemon_binary {
            Some(p) => p.clone(),
            None => std::env::current_exe().map_err(ClientError::Spawn)?,
        };
        std::process::Command::new(program)
            .args(["daemon", "start", "--foreground"])
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(ClientError::Spawn)?;
        Ok(())
    }

    /// Send `request` and decode the matching response's payload as `T`.
    async fn request<T: DeserializeOwned>(&mut self, request: Request) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        if !response.success {
            return Err(ClientError::Remote(response.error.unwrap_or_default()));
        }
        response.into_data().map_err(ClientError::from)
    }

    /// Send `request` and return the raw response, without assuming
    /// success or a particular payload shape.
    pub async fn send(&mut self, request: Request) -> Result<Response, ClientError> {
        let envelope = Envelope::for_request(Envelope::new_id(), now_ms(), request);
        let request_id = envelope.id.clone();
        write_envelope(&mut self.stream, &envelope).await?;
        let mut reader = MessageReader::new(&mut self.stream);
        let response_envelope = reader.read_envelope().await?;

        if response_envelope.kind != EnvelopeKind::Response || response_envelope.id != request_id {
            let _ = self.stream.shutdown().await;
            return Err(ClientError::IdMismatch { expected: request_id, actual: response_envelope.id });
        }

        response_envelope.response.ok_or_else(|| {
            ClientError::Remote("daemon sent a request envelope instead of a response".to_string())
        })
    }

    pub async fn status(&mut self) -> Result<fman_core::DaemonStatus, ClientError> {
        self.request(Request::Status).await
    }

    pub async fn scan(
        &mut self,
        path: PathBuf,
        options: ScanOptions,
    ) -> Result<fman_core::Job, ClientError> {
        self.request(Request::Scan { path, options }).await
    }

    pub async fn job_status(&mut self, id: JobId) -> Result<fman_core::Job, ClientError> {
        self.request(Request::JobStatus(id.to_string())).await
    }

    pub async fn list_jobs(
        &mut self,
        filter: Option<fman_core::JobStatus>,
    ) -> Result<Vec<fman_core::Job>, ClientError> {
        self.request(Request::JobList(filter.map(|s| s.to_string()))).await
    }

    pub async fn cancel_job(&mut self, id: JobId) -> Result<(), ClientError> {
        let response = self.send(Request::JobCancel(id.to_string())).await?;
        if response.success {
            Ok(())
        } else {
            Err(ClientError::Remote(response.error.unwrap_or_default()))
        }
    }

    pub async fn clear_queue(&mut self) -> Result<(), ClientError> {
        let response = self.send(Request::QueueClear).await?;
        if response.success {
            Ok(())
        } else {
            Err(ClientError::Remote(response.error.unwrap_or_default()))
        }
    }

    pub async fn stop_daemon(&mut self) -> Result<(), ClientError> {
        let response = self.send(Request::Shutdown).await?;
        if response.success {
            Ok(())
        } else {
            Err(ClientError::Remote(response.error.unwrap_or_default()))
        }
    }
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or_else(|e| {
        warn!(error = %e, "system clock before Unix epoch");
        0
    })
}

#[cfg(test)]
#[path = "connect_tests.rs"]
mod tests;
