//! Error types for the category layer.

use f2l_protocol::{CategoryId, PayloadKind, ProtocolError, VersionType};
use f2l_transport::TransportError;

/// Errors raised by categories and by the transport on their behalf.
///
/// None of these are retried by the category layer; they propagate to
/// whichever call or dispatch triggered them. A version-gated operation
/// that is unavailable is *not* an error (see
/// [`CategoryCore::is_method_supported`](crate::CategoryCore::is_method_supported)).
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// Negotiation asked for a version outside the supported set.
    /// The category keeps its previous version.
    #[error("category {category} does not support version {version}")]
    UnsupportedVersion {
        /// The category that rejected the version.
        category: CategoryId,
        /// The rejected version.
        version: VersionType,
    },

    /// The Foundation answered with a nonzero status.
    #[error("foundation replied with error {code}: {description}")]
    FoundationReply {
        /// The status code from the reply.
        code: i32,
        /// The reason from the reply, empty if none was given.
        description: String,
    },

    /// An inbound frame had no handler, or a reply arrived that the
    /// category never expects.
    #[error("category {category} cannot handle {kind} {message_type}")]
    UnhandledReplyType {
        /// The category the frame was addressed to.
        category: CategoryId,
        /// Payload shape of the frame.
        kind: PayloadKind,
        /// Wire name of the frame's body.
        message_type: String,
    },

    /// A second handler was registered for the same message type.
    #[error("category {category} already has a handler for {message_type}")]
    DuplicateHandler {
        /// The category being wired.
        category: CategoryId,
        /// The contested message type.
        message_type: String,
    },

    /// A structural precondition was violated.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Encoding or decoding a frame or body failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The transport failed (closed, timed out, could not send).
    #[error(transparent)]
    Transport(#[from] TransportError),
}
