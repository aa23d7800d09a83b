// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::{Request, Response};

/// Discriminates which of `request`/`response` an [`Envelope`] carries.
///
/// `Notification` is reserved for future server-initiated pushes; the
/// current protocol never emits it, but it's part of the closed set the
/// wire format names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    Request,
    Response,
    Notification,
}

/// The outer message carried over the socket: a correlation id and
/// timestamp wrapping exactly one of `request` or `response`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub id: String,
    /// Milliseconds since the Unix epoch, UTC.
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
}

impl Envelope {
    /// Wrap a request with a fresh correlation id and the given timestamp.
    pub fn for_request(id: String, timestamp_ms: u64, request: Request) -> Self {
        Self { kind: EnvelopeKind::Request, id, timestamp_ms, request: Some(request), response: None }
    }

    /// Wrap a response reusing the correlation id of the request it answers.
    pub fn for_response(id: String, timestamp_ms: u64, response: Response) -> Self {
        Self { kind: EnvelopeKind::Response, id, timestamp_ms, request: None, response: Some(response) }
    }

    /// A fresh correlation id. Not cryptographically meaningful, only
    /// needs to be unique per in-flight request on a connection.
    pub fn new_id() -> String {
        nanoid::nanoid!(21)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
