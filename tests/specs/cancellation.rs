// SPDX-License-Identifier: MIT

//! S4 (cancellation): cancelling a running scan flips it to `cancelled`
//! within the polling/retry budget and stops further progress.

use std::time::Duration;

use crate::prelude::*;

#[test]
fn cancelling_a_running_scan_marks_it_cancelled_promptly() {
    let home = TestHome::new();
    home.start_daemon();

    let root = home.scan_root("A");
    for i in 0..300 {
        home.write_file(&format!("A/f{i:04}.txt"), b"x");
    }

    let output = home
        .fman()
        .args(["scan", &root.to_string_lossy(), "--throttle-delay-ms", "300"])
        .output()
        .expect("run fman scan");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let id = stdout.trim().strip_prefix("enqueued job ").expect("job id in output").to_string();

    let running = wait_for(WAIT_MAX, || {
        job_status_json(&home, &id)["status"].as_str() == Some("running")
    });
    assert!(running, "scan never started running");

    home.fman().args(["job", "cancel", &id]).assert().success();

    let cancelled = wait_for(Duration::from_secs(2), || {
        job_status_json(&home, &id)["status"].as_str() == Some("cancelled")
    });
    assert!(cancelled, "job was not cancelled within the budget");

    let job = job_status_json(&home, &id);
    assert!(job["completed_at_ms"].is_number(), "completed_at_ms should be set once cancelled");

    let snapshot_a = job_status_json(&home, &id)["stats"]["files_indexed"].clone();
    std::thread::sleep(Duration::from_millis(200));
    let snapshot_b = job_status_json(&home, &id)["stats"]["files_indexed"].clone();
    assert_eq!(snapshot_a, snapshot_b, "cancelled job should stop making progress");

    home.stop_daemon();
}
