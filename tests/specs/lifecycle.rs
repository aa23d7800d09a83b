// SPDX-License-Identifier: MIT

//! Invariant 1 (single-instance): a second `daemon start` against a live
//! PID fails; starting again after a clean stop succeeds.

use crate::prelude::*;

#[test]
fn daemon_status_reports_not_running_before_start() {
    let home = TestHome::new();
    home.fman().args(["daemon", "status"]).assert().failure();
}

#[test]
fn daemon_reports_running_after_start_then_stops_cleanly() {
    let home = TestHome::new();
    home.start_daemon();

    let output = home.fman().args(["daemon", "status"]).output().expect("run fman daemon status");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("running"));

    home.stop_daemon();
    home.fman().args(["daemon", "status"]).assert().failure();
}

#[test]
fn starting_a_second_daemon_against_a_live_pid_fails() {
    let home = TestHome::new();
    home.start_daemon();

    home.fman().args(["daemon", "start"]).assert().failure();

    home.stop_daemon();
}

#[test]
fn daemon_can_restart_after_a_clean_stop() {
    let home = TestHome::new();
    home.start_daemon();
    home.stop_daemon();
    home.start_daemon();
    home.fman().args(["daemon", "status"]).assert().success();
    home.stop_daemon();
}
