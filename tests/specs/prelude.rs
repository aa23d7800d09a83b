// SPDX-License-Identifier: MIT

//! Shared scaffolding for the end-to-end specs: a throwaway `$FMAN_HOME`
//! per test and thin wrappers around invoking the `fman` binary.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use assert_cmd::Command;

pub const WAIT_MAX: Duration = Duration::from_secs(5);

/// An isolated `FMAN_HOME` for one test, torn down with its `TempDir`.
pub struct TestHome {
    home: tempfile::TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self { home: tempfile::tempdir().expect("create temp home") }
    }

    pub fn path(&self) -> &Path {
        self.home.path()
    }

    pub fn socket_path(&self) -> PathBuf {
        self.path().join(".fman").join("daemon.sock")
    }

    fn store_path(&self) -> PathBuf {
        self.path().join(".fman").join("index.db")
    }

    /// Open a second connection to the running daemon's metadata store,
    /// for assertions the socket protocol doesn't expose (raw file records).
    pub fn open_store(&self) -> fman_storage::SqliteStore {
        fman_storage::SqliteStore::open(&self.store_path()).expect("open daemon's metadata store")
    }

    /// A fresh `fman` invocation rooted at this home, with auto-start
    /// disabled so tests control daemon lifecycle explicitly.
    pub fn fman(&self) -> Command {
        let mut cmd = Command::cargo_bin("fman").expect("find fman binary");
        cmd.env("FMAN_HOME", self.path());
        cmd.env("FMAN_CLIENT_TEST_MODE", "1");
        cmd
    }

    /// Start the daemon in the background and wait until it answers
    /// `daemon status`.
    pub fn start_daemon(&self) {
        self.fman().args(["daemon", "start"]).assert().success();
        let ready = wait_for(WAIT_MAX, || self.fman().args(["daemon", "status"]).output().map(|o| o.status.success()).unwrap_or(false));
        assert!(ready, "daemon never became reachable");
    }

    pub fn stop_daemon(&self) {
        self.fman().args(["daemon", "stop"]).assert().success();
    }

    /// Create a file with `contents` at `relative`, creating parent
    /// directories as needed, and return its absolute path.
    pub fn write_file(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Write `<home>/.fman/config.toml` before starting the daemon.
    pub fn write_config(&self, toml: &str) {
        self.write_file(".fman/config.toml", toml.as_bytes());
    }

    pub fn scan_root(&self, relative: &str) -> PathBuf {
        let path = self.path().join(relative);
        std::fs::create_dir_all(&path).expect("create scan root");
        path
    }
}

/// Poll `predicate` until it returns true or `timeout` elapses.
pub fn wait_for(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Parse the stdout of a successful `fman job status <id>` call.
pub fn job_status_json(home: &TestHome, id: &str) -> serde_json::Value {
    let output = home.fman().args(["job", "status", id]).output().expect("run fman job status");
    assert!(output.status.success(), "job status failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("parse job status JSON")
}

/// Submit a scan and return the new job's id, parsed out of `fman scan`'s
/// "enqueued job <id>" line.
pub fn submit_scan(home: &TestHome, path: &Path) -> String {
    let output = home.fman().args(["scan", &path.to_string_lossy()]).output().expect("run fman scan");
    assert!(output.status.success(), "scan failed: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .strip_prefix("enqueued job ")
        .unwrap_or_else(|| panic!("unexpected scan output: {stdout}"))
        .to_string()
}
