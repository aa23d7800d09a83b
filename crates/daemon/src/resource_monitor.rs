// SPDX-License-Identifier: MIT

//! Periodically samples memory/CPU pressure and raises a throttle flag
//! workers consult before pulling the next job.

use std::time::Duration;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default sampling interval.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(4);
/// Default pause inserted by [`ResourceMonitor::wait_if_throttling`].
pub const DEFAULT_THROTTLE_DELAY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    pub memory_cap_bytes: u64,
    pub cpu_pressure_cap: f64,
    pub sample_interval: Duration,
    pub throttle_delay: Duration,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            memory_cap_bytes: 512 * 1024 * 1024,
            cpu_pressure_cap: 0.9,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            throttle_delay: DEFAULT_THROTTLE_DELAY,
        }
    }
}

/// Samples resident memory and an active-worker/core-count CPU pressure
/// proxy on an interval, raising a throttle flag consulted by workers.
pub struct ResourceMonitor {
    limits: ResourceLimits,
    throttling: RwLock<bool>,
}

impl ResourceMonitor {
    pub fn new(limits: ResourceLimits) -> Self {
        Self { limits, throttling: RwLock::new(false) }
    }

    pub fn should_throttle(&self) -> bool {
        *self.throttling.read()
    }

    /// Sleep for the configured throttle delay if currently throttling;
    /// a no-op otherwise. Cancellation-aware.
    pub async fn wait_if_throttling(&self, token: &CancellationToken) {
        if !self.should_throttle() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.limits.throttle_delay) => {}
            _ = token.cancelled() => {}
        }
    }

    /// Take one sample: resident memory plus `active_workers / cores` as
    /// the CPU pressure proxy. Sets or clears the throttle flag.
    pub fn sample(&self, active_workers: usize) {
        let memory = sample_resident_memory_bytes();
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let cpu_pressure = active_workers as f64 / cores as f64;

        let over_memory = memory > self.limits.memory_cap_bytes;
        let over_cpu = cpu_pressure > self.limits.cpu_pressure_cap;
        let throttling = over_memory || over_cpu;

        if over_memory {
            debug!(memory, cap = self.limits.memory_cap_bytes, "memory cap exceeded, requesting collection");
            request_collection_hint();
        }
        *self.throttling.write() = throttling;
    }

    /// Run the sampling loop until `token` is cancelled.
    pub async fn run(&self, active_workers: impl Fn() -> usize, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.limits.sample_interval) => {
                    self.sample(active_workers());
                }
                _ = token.cancelled() => return,
            }
        }
    }
}

/// Resident set size in bytes, read from `/proc/self/statm` on Linux.
/// Returns 0 on platforms or errors where the proxy isn't available;
/// callers treat that as "not over budget" rather than failing the scan.
fn sample_resident_memory_bytes() -> u64 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(contents) = std::fs::read_to_string("/proc/self/statm") {
            let page_size = 4096u64;
            if let Some(resident_pages) = contents.split_whitespace().nth(1) {
                if let Ok(pages) = resident_pages.parse::<u64>() {
                    return pages * page_size;
                }
            }
        }
        0
    }
    #[cfg(not(target_os = "linux"))]
    {
        0
    }
}

/// Rust has no garbage collector to hint; this is a deliberately inert
/// stand-in for the source system's GC-hint call, kept as a named hook
/// so the throttle-on-memory-pressure path has somewhere to act if a
/// future allocator integration wants it.
fn request_collection_hint() {}

#[cfg(test)]
#[path = "resource_monitor_tests.rs"]
mod tests;
