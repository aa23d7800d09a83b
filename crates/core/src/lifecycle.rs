// SPDX-License-Identifier: MIT

//! Single-instance liveness probe shared by the daemon and the client.
//!
//! The PID file's presence and a live-process signal together certify a
//! running daemon; neither alone is sufficient (a stale PID file can
//! outlive its process; a PID can be recycled by an unrelated process,
//! which is an accepted inexactness documented in DESIGN.md).

use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::path::Path;

/// Read a PID file and probe whether the referenced process is alive.
///
/// Any failure along the chain (missing file, unparsable contents, no
/// such process, permission denied probing it) reports `false`.
pub fn is_running(pid_path: &Path) -> bool {
    read_pid(pid_path).map(probe).unwrap_or(false)
}

/// Read and parse the PID stored at `pid_path`, if any.
pub fn read_pid(pid_path: &Path) -> Option<i32> {
    let contents = std::fs::read_to_string(pid_path).ok()?;
    contents.trim().parse::<i32>().ok()
}

/// Send signal 0 to `pid`: delivers no signal, but fails if the process
/// does not exist or is not signalable by this user.
pub fn probe(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}
