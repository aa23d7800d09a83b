// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let home = tempfile::tempdir().unwrap();
    let config = Config::load_from_home(home.path()).unwrap();
    assert_eq!(config.max_workers, DEFAULT_MAX_WORKERS);
    assert_eq!(config.queue_size, DEFAULT_QUEUE_SIZE);
    assert_eq!(config.socket_path, home.path().join(".fman/daemon.sock"));
    assert_eq!(config.pid_path, home.path().join(".fman/daemon.pid"));
}

#[test]
fn reads_overrides_and_ignores_unknown_keys() {
    let home = tempfile::tempdir().unwrap();
    let fman_dir = home.path().join(".fman");
    std::fs::create_dir_all(&fman_dir).unwrap();
    std::fs::write(
        fman_dir.join("config.toml"),
        r#"
        max_workers = 8
        queue_size = 50
        log_level = "debug"
        something_unknown = true
        "#,
    )
    .unwrap();

    let config = Config::load_from_home(home.path()).unwrap();
    assert_eq!(config.max_workers, 8);
    assert_eq!(config.queue_size, 50);
    assert_eq!(config.log_level, "debug");
}

#[test]
fn relative_socket_path_is_joined_under_fman_dir() {
    let home = tempfile::tempdir().unwrap();
    let fman_dir = home.path().join(".fman");
    std::fs::create_dir_all(&fman_dir).unwrap();
    std::fs::write(fman_dir.join("config.toml"), r#"socket_path = "custom.sock""#).unwrap();

    let config = Config::load_from_home(home.path()).unwrap();
    assert_eq!(config.socket_path, fman_dir.join("custom.sock"));
}
