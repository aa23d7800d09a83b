// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("daemon did not become reachable within the connect timeout")]
    ConnectTimeout,
    #[error("failed to spawn the daemon: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] fman_wire::ProtocolError),
    #[error("daemon returned an error: {0}")]
    Remote(String),
    #[error("response id {actual} did not match request id {expected}")]
    IdMismatch { expected: String, actual: String },
}
