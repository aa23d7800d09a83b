// SPDX-License-Identifier: MIT

//! Process-level glue distinct from [`fman_core::lifecycle`]'s liveness
//! probe: signal handling and backgrounding.

use std::io;
use std::path::Path;
use std::process::{Child, Command};

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Spawn a task that cancels `token` on receiving SIGINT or SIGTERM,
/// so the rest of the daemon can treat both as one graceful-stop signal.
#[cfg(unix)]
pub fn install_signal_handlers(token: CancellationToken) -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
        token.cancel();
    });
    Ok(())
}

#[cfg(not(unix))]
pub fn install_signal_handlers(token: CancellationToken) -> io::Result<()> {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        token.cancel();
    });
    Ok(())
}

/// Relaunch the current executable with `args`, detached into its own
/// process group so it survives the parent exiting (e.g. a CLI `daemon
/// start --background` command returning to the shell).
///
/// Uses `process_group(0)` rather than a `pre_exec` `setsid()` call,
/// since the latter requires `unsafe`.
pub fn spawn_background(program: &Path, args: &[String]) -> io::Result<Child> {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        Command::new(program)
            .args(args)
            .process_group(0)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
    }
    #[cfg(not(unix))]
    {
        Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
