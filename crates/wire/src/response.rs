// SPDX-License-Identifier: MIT

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// A response from the daemon to a client.
///
/// `data` is opaque to the codec: the server encodes a typed DTO into it
/// via `serde_json::to_value`, and the client decodes it back into a
/// typed value via [`Response::into_data`]. This keeps the envelope and
/// framing layer ignorant of what any particular request returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Build a success response carrying a typed payload.
    pub fn ok<T: Serialize>(value: &T) -> Result<Self, ProtocolError> {
        let data = serde_json::to_value(value).map_err(ProtocolError::Encode)?;
        Ok(Self { success: true, data: Some(data), error: None })
    }

    /// Build a success response with no payload.
    pub fn ok_empty() -> Self {
        Self { success: true, data: None, error: None }
    }

    /// Build a failure response carrying a descriptive message.
    pub fn error(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }

    /// Decode `data` into a typed value.
    ///
    /// Fails with [`ProtocolError::Decode`] if this is an error response
    /// or the payload doesn't match `T`'s shape.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ProtocolError> {
        if !self.success {
            return Err(ProtocolError::Remote(self.error.unwrap_or_default()));
        }
        let data = self.data.ok_or(ProtocolError::MissingPayload)?;
        serde_json::from_value(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
