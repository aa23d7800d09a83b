// SPDX-License-Identifier: MIT

//! S2 (skip pattern): files under a skip-listed directory are excluded
//! from the index and counted as a skipped directory.

use crate::prelude::*;

#[test]
fn scan_skips_trash_directory_and_indexes_the_rest() {
    let home = TestHome::new();
    home.start_daemon();

    home.write_file("A/normal/x.txt", b"keep me");
    home.write_file("A/.Trash/y.txt", b"discard me");

    let id = submit_scan(&home, &home.path().join("A"));

    let completed = wait_for(WAIT_MAX, || {
        job_status_json(&home, &id)["status"].as_str() == Some("completed")
    });
    assert!(completed, "scan never completed");

    let job = job_status_json(&home, &id);
    assert_eq!(job["stats"]["files_indexed"], 1);
    assert!(job["stats"]["directories_skipped"].as_u64().unwrap_or(0) >= 1);

    let store = home.open_store();
    assert!(store.find_by_path(&home.path().join("A/.Trash/y.txt")).unwrap().is_none());
    assert!(store.find_by_path(&home.path().join("A/normal/x.txt")).unwrap().is_some());

    home.stop_daemon();
}
