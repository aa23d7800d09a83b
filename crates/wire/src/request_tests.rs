// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn scan_request_round_trips() {
    let req = Request::Scan {
        path: PathBuf::from("/home/user/docs"),
        options: ScanOptions::default(),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("\"type\":\"scan\""));
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(req, back);
}

#[test]
fn unit_variant_has_no_data_field() {
    let json = serde_json::to_string(&Request::Status).unwrap();
    assert_eq!(json, r#"{"type":"status"}"#);
}

#[test]
fn job_status_carries_bare_string() {
    let req = Request::JobStatus("job-abc".to_string());
    let json = serde_json::to_string(&req).unwrap();
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(req, back);
}

#[test]
fn job_list_without_filter_defaults_to_none() {
    let json = r#"{"type":"job_list"}"#;
    let req: Request = serde_json::from_str(json).unwrap();
    assert_eq!(req, Request::JobList(None));
}
