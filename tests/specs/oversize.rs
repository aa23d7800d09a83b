// SPDX-License-Identifier: MIT

//! S3 (oversize skip): a file past `max_hash_file_size` is recorded with
//! the sentinel hash and its true size, not an actual content hash.

use crate::prelude::*;

#[test]
fn files_past_the_hash_size_cap_get_the_sentinel_hash() {
    let home = TestHome::new();
    home.start_daemon();

    let big = vec![b'x'; 2048];
    home.write_file("A/big.bin", &big);

    let output = home
        .fman()
        .args(["scan", &home.path().join("A").to_string_lossy(), "--max-hash-file-size", "1024"])
        .output()
        .expect("run fman scan");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let id = stdout.trim().strip_prefix("enqueued job ").expect("job id in output").to_string();

    let completed = wait_for(WAIT_MAX, || {
        job_status_json(&home, &id)["status"].as_str() == Some("completed")
    });
    assert!(completed, "scan never completed");

    let store = home.open_store();
    let record = store.find_by_path(&home.path().join("A/big.bin")).unwrap().expect("big.bin record");
    assert_eq!(record.content_hash, fman_core::SENTINEL_HASH);
    assert_eq!(record.size_bytes, 2048);

    home.stop_daemon();
}
