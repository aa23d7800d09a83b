// SPDX-License-Identifier: MIT

//! The fman daemon: admission, job queue, resource-aware scanning, and
//! the Unix-socket server that fronts it all.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod path_normalizer;
pub mod queue;
pub mod resource_monitor;
pub mod server;
pub mod traversal_filter;
pub mod walker;
pub mod worker;

pub use config::Config;
pub use error::DaemonError;
pub use path_normalizer::PathNormalizer;
pub use queue::JobQueue;
pub use resource_monitor::{ResourceLimits, ResourceMonitor};
pub use server::{Server, ServerHandle};
