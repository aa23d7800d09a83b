// SPDX-License-Identifier: MIT

//! End-to-end specs driven entirely through the `fman` binary.

mod prelude;

mod cancellation;
mod conflict;
mod lifecycle;
mod oversize;
mod round_trip;
mod skip_pattern;
