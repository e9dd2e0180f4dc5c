//! Codec trait and implementations for serializing frames and bodies.
//!
//! The category layer never cares HOW a frame becomes bytes, only that
//! something implements [`Codec`]. A session is generic over its codec so
//! a binary format can replace JSON without touching any category.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// The same codec encodes both the outer [`Frame`](crate::Frame) and the
/// message body inside it, so both ends of a session must agree on it.
///
/// `Send + Sync + 'static` because a session shares its codec between the
/// caller's task, the writer task and the delivery task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Human-readable, which makes frames easy to inspect in logs while a
/// Foundation integration is being brought up.
///
/// ## Example
///
/// ```rust
/// use f2l_protocol::{
///     CategoryId, Channel, Codec, Frame, JsonCodec, MessageId, PayloadKind,
///     VersionType,
/// };
///
/// let codec = JsonCodec;
///
/// let frame = Frame {
///     id: MessageId(1),
///     in_reply_to: None,
///     channel: Channel::Foundation,
///     category: CategoryId::GameControl,
///     version: VersionType::new(1, 1),
///     kind: PayloadKind::Notification,
///     message_type: "BetCommittedNotification".into(),
///     transaction: None,
///     body: b"{}".to_vec(),
/// };
///
/// let bytes = codec.encode(&frame).unwrap();
/// let decoded: Frame = codec.decode(&bytes).unwrap();
/// assert_eq!(frame, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<u32, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_encode_produces_json_text() {
        let bytes = JsonCodec.encode(&vec![1u8, 2, 3]).unwrap();
        assert_eq!(bytes, b"[1,2,3]");
    }
}
