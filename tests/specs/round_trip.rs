// SPDX-License-Identifier: MIT

//! S1 (round-trip): scan a small tree and confirm the job completes with
//! the right statistics and that recorded hashes match the file bytes.

use sha2::{Digest, Sha256};

use crate::prelude::*;

fn hex_sha256(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn scan_indexes_files_and_records_matching_hashes() {
    let home = TestHome::new();
    home.start_daemon();

    home.write_file("A/x.txt", b"content1");
    home.write_file("A/sub/y.txt", b"content2");

    let id = submit_scan(&home, &home.path().join("A"));

    let completed = wait_for(WAIT_MAX, || {
        job_status_json(&home, &id)["status"].as_str() == Some("completed")
    });
    assert!(completed, "scan never completed");

    let job = job_status_json(&home, &id);
    assert_eq!(job["stats"]["files_indexed"], 2);
    assert_eq!(job["stats"]["permission_errors"], 0);

    let store = home.open_store();
    let x = store.find_by_path(&home.path().join("A/x.txt")).unwrap().expect("x.txt record");
    let y = store.find_by_path(&home.path().join("A/sub/y.txt")).unwrap().expect("y.txt record");
    assert_eq!(x.content_hash, hex_sha256(b"content1"));
    assert_eq!(y.content_hash, hex_sha256(b"content2"));

    home.stop_daemon();
}
