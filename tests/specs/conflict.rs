// SPDX-License-Identifier: MIT

//! S5 (conflict rejection) and S6 (duplicate path): a second scan whose
//! path overlaps an in-flight job is rejected, and the queue stays at
//! one pending job either way.
//!
//! Both scenarios pin `max_workers = 0` so the first job stays pending
//! instead of racing to completion before the second request lands.

use crate::prelude::*;

fn queued_count(home: &TestHome) -> u32 {
    let output = home.fman().args(["daemon", "status"]).output().expect("run fman daemon status");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .split_whitespace()
        .find_map(|tok| tok.strip_prefix("queued="))
        .and_then(|n| n.parse().ok())
        .unwrap_or_else(|| panic!("no queued= field in status output: {stdout}"))
}

#[test]
fn a_child_path_is_rejected_as_a_conflict() {
    let home = TestHome::new();
    home.write_config("max_workers = 0\n");
    home.start_daemon();

    home.scan_root("docs/reports");
    submit_scan(&home, &home.path().join("docs"));

    let output = home
        .fman()
        .args(["scan", &home.path().join("docs/reports").to_string_lossy()])
        .output()
        .expect("run fman scan");
    assert!(!output.status.success(), "overlapping scan should be rejected");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("conflict"), "expected a conflict error, got: {stderr}");

    assert_eq!(queued_count(&home), 1);

    home.stop_daemon();
}

#[test]
fn the_same_path_submitted_twice_is_rejected_as_a_duplicate() {
    let home = TestHome::new();
    home.write_config("max_workers = 0\n");
    home.start_daemon();

    let root = home.scan_root("docs");
    submit_scan(&home, &root);

    let output = home.fman().args(["scan", &root.to_string_lossy()]).output().expect("run fman scan");
    assert!(!output.status.success(), "duplicate scan should be rejected");

    assert_eq!(queued_count(&home), 1);

    home.stop_daemon();
}
