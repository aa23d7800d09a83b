// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] fman_client::ClientError),
    #[error(transparent)]
    Server(#[from] fman_daemon::server::ServerError),
    #[error(transparent)]
    Config(#[from] fman_daemon::config::ConfigError),
    #[error(transparent)]
    Store(#[from] fman_storage::StoreError),
    #[error("daemon is not running")]
    NotRunning,
    #[error("daemon is already running")]
    AlreadyRunning,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
