//! JSON codec for Connect-Four wire messages.
//!
//! Wire format: one UTF-8 JSON object per WebSocket text frame, discriminated
//! by its `"type"` field.  The codec is transport-independent; it only turns
//! typed messages into text and back.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not valid JSON, has an unknown `type`, or a field is
    /// missing or out of range.
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The message could not be serialised.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Encodes a message into its JSON text form.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialisation fails.
///
/// # Examples
///
/// ```rust
/// use c4_core::protocol::{decode, encode, ClientMessage};
///
/// let msg = ClientMessage::move_to(3);
/// let text = encode(&msg).unwrap();
/// assert_eq!(text, r#"{"type":"move","column":"3"}"#);
/// assert_eq!(decode::<ClientMessage>(&text).unwrap(), msg);
/// ```
pub fn encode<M: Serialize>(msg: &M) -> Result<String, CodecError> {
    serde_json::to_string(msg).map_err(CodecError::Encode)
}

/// Decodes one message from JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] for anything that is not a well-formed
/// message of type `M`.
pub fn decode<M: DeserializeOwned>(text: &str) -> Result<M, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Malformed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
