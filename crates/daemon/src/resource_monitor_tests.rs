// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn not_throttling_by_default() {
    let monitor = ResourceMonitor::new(ResourceLimits::default());
    assert!(!monitor.should_throttle());
}

#[test]
fn sample_sets_throttle_when_cpu_pressure_cap_exceeded() {
    let limits = ResourceLimits { cpu_pressure_cap: 0.01, ..ResourceLimits::default() };
    let monitor = ResourceMonitor::new(limits);
    monitor.sample(1000);
    assert!(monitor.should_throttle());
}

#[test]
fn sample_clears_throttle_when_under_caps() {
    let limits = ResourceLimits { cpu_pressure_cap: 100.0, ..ResourceLimits::default() };
    let monitor = ResourceMonitor::new(limits);
    monitor.sample(1);
    assert!(!monitor.should_throttle());
}

#[tokio::test]
async fn wait_if_throttling_is_a_no_op_when_not_throttling() {
    let monitor = ResourceMonitor::new(ResourceLimits::default());
    let token = CancellationToken::new();
    let start = std::time::Instant::now();
    monitor.wait_if_throttling(&token).await;
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[tokio::test]
async fn wait_if_throttling_respects_cancellation() {
    let limits = ResourceLimits {
        cpu_pressure_cap: 0.0001,
        throttle_delay: Duration::from_secs(5),
        ..ResourceLimits::default()
    };
    let monitor = ResourceMonitor::new(limits);
    monitor.sample(10);
    assert!(monitor.should_throttle());

    let token = CancellationToken::new();
    token.cancel();
    let start = std::time::Instant::now();
    monitor.wait_if_throttling(&token).await;
    assert!(start.elapsed() < Duration::from_millis(200));
}
