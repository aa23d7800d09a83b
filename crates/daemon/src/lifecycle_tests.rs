// SPDX-License-Identifier: MIT

use super::*;

#[tokio::test]
async fn sigterm_cancels_the_token() {
    let token = CancellationToken::new();
    install_signal_handlers(token.clone()).unwrap();

    nix::sys::signal::kill(nix::unistd::Pid::this(), nix::sys::signal::Signal::SIGTERM).unwrap();

    tokio::time::timeout(std::time::Duration::from_secs(2), token.cancelled())
        .await
        .expect("token should be cancelled after SIGTERM");
}

#[test]
fn spawn_background_runs_a_detached_process() {
    let mut child = spawn_background(Path::new("/bin/true"), &[]).unwrap();
    let status = child.wait().unwrap();
    assert!(status.success());
}
