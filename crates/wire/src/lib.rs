// SPDX-License-Identifier: MIT

//! Message envelope and streaming JSON codec for the daemon's client
//! protocol.
//!
//! Wire format: a stream of self-delimiting JSON [`Envelope`] values over
//! a local stream socket, capped at [`MAX_MESSAGE_BYTES`] per message.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod envelope;
mod request;
mod response;

pub use codec::{write_envelope, MessageReader, ProtocolError, MAX_MESSAGE_BYTES};
pub use envelope::{Envelope, EnvelopeKind};
pub use request::Request;
pub use response::Response;
