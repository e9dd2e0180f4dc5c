//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. A
//! `ProtocolError` always means the bytes or the frame header were wrong,
//! never that the connection or a category misbehaved.

/// Errors that can occur while encoding or decoding frames and bodies.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// wrong data types, or truncated frames.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A frame was asked to decode as a message type it does not carry.
    #[error("frame carries {actual}, expected {expected}")]
    MessageTypeMismatch {
        /// The message type the caller asked for.
        expected: &'static str,
        /// The message type named in the frame header.
        actual: String,
    },

    /// The frame is invalid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
