// SPDX-License-Identifier: MIT

//! Streaming JSON framing: one top-level [`Envelope`] at a time, with an
//! absolute size cap enforced before a value is ever handed to the JSON
//! parser.
//!
//! Framing intentionally carries no length prefix or delimiter. JSON
//! objects are self-delimiting, so `serde_json`'s streaming deserializer
//! can recover message boundaries from a growing byte buffer alone; this
//! keeps the wire format a plain sequence of JSON values, which is easier
//! to inspect on the wire than a binary-prefixed alternative.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::Envelope;

/// Absolute upper bound on a single message, per spec §6.1.
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("message exceeds the 1 MiB maximum")]
    MessageTooLarge,
    #[error("connection closed before a complete message was read")]
    Eof,
    #[error("response missing expected payload")]
    MissingPayload,
    #[error("remote error: {0}")]
    Remote(String),
}

/// Incrementally decodes [`Envelope`]s from an async byte stream.
///
/// Owns a growing buffer across calls so that bytes read past one
/// message's boundary (if a client ever pipelines) are preserved for the
/// next `read_envelope` call rather than discarded.
pub struct MessageReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new() }
    }

    /// Read the next complete envelope, blocking until enough bytes have
    /// arrived or the cap is exceeded.
    ///
    /// Returns [`ProtocolError::Eof`] if the peer closes the connection
    /// before a full message arrives (including cleanly, with zero bytes
    /// buffered — the normal way a connection ends).
    pub async fn read_envelope(&mut self) -> Result<Envelope, ProtocolError> {
        let mut chunk = [0u8; 4096];
        loop {
            if let Some(envelope) = self.try_parse_buffered()? {
                return Ok(envelope);
            }

            if self.buf.len() >= MAX_MESSAGE_BYTES {
                return Err(ProtocolError::MessageTooLarge);
            }

            let n = self.reader.read(&mut chunk).await?;
            if n == 0 {
                return Err(ProtocolError::Eof);
            }
            if self.buf.len() + n > MAX_MESSAGE_BYTES {
                return Err(ProtocolError::MessageTooLarge);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Try to parse one envelope out of the buffered bytes, leaving any
    /// trailing bytes in place for the next message.
    fn try_parse_buffered(&mut self) -> Result<Option<Envelope>, ProtocolError> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        let mut stream = serde_json::Deserializer::from_slice(&self.buf).into_iter::<Envelope>();
        match stream.next() {
            Some(Ok(envelope)) => {
                let consumed = stream.byte_offset();
                self.buf.drain(..consumed);
                Ok(Some(envelope))
            }
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(ProtocolError::Decode(e)),
            None => Ok(None),
        }
    }
}

/// Write a single envelope, encoding it as one JSON value with no
/// trailing delimiter.
pub async fn write_envelope<W: AsyncWrite + Unpin>(
    writer: &mut W,
    envelope: &Envelope,
) -> Result<(), ProtocolError> {
    let bytes = serde_json::to_vec(envelope).map_err(ProtocolError::Encode)?;
    if bytes.len() > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::MessageTooLarge);
    }
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
