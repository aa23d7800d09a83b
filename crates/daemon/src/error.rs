// SPDX-License-Identifier: MIT

//! Error taxonomy for the scan-execution subsystem.

use fman_core::JobId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("daemon is already running")]
    AlreadyRunning,
    #[error("daemon is not running")]
    NotRunning,
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("queue is full")]
    QueueFull,
    #[error("duplicate path: {0}")]
    DuplicatePath(std::path::PathBuf),
    #[error("path conflict ({conflict}): {path}")]
    PathConflict { path: std::path::PathBuf, conflict: fman_core::Conflict },
    #[error("operation cancelled")]
    Cancelled,
    #[error("illegal job transition for {0}")]
    IllegalTransition(JobId),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] fman_storage::StoreError),
    #[error(transparent)]
    Protocol(#[from] fman_wire::ProtocolError),
    #[error(transparent)]
    Normalize(#[from] crate::path_normalizer::NormalizeError),
}

impl DaemonError {
    /// Stable lowercase identifier matching the taxonomy in the design
    /// docs (`daemon_already_running`, `job_not_found`, ...), used in
    /// structured log fields and surfaced to clients via `Response::error`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyRunning => "daemon_already_running",
            Self::NotRunning => "daemon_not_running",
            Self::JobNotFound(_) => "job_not_found",
            Self::InvalidRequest(_) => "invalid_request",
            Self::QueueFull => "queue_full",
            Self::DuplicatePath(_) => "duplicate_path",
            Self::PathConflict { .. } => "path_conflict",
            Self::Cancelled => "cancelled",
            Self::IllegalTransition(_) => "illegal_transition",
            Self::Io(_) => "io_error",
            Self::Store(_) => "store_error",
            Self::Protocol(fman_wire::ProtocolError::MessageTooLarge) => "message_too_large",
            Self::Protocol(_) => "protocol_error",
            Self::Normalize(_) => "normalization_error",
        }
    }
}
