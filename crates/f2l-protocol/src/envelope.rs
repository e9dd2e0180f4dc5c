//! Typed envelopes and the untyped wire frame.
//!
//! A category builds an [`Envelope<M>`] around one typed body. When the
//! envelope is handed to the transport it is flattened into a [`Frame`]:
//! the routing header stays readable, the body becomes opaque bytes.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ id: M-17          in_reply_to: -     │  ← correlation
//! │ channel: Foundation                  │  ← logical destination
//! │ category: GameControl  version: 1.1  │  ← namespace + version stamp
//! │ kind: Request                        │
//! │ message_type: "CommitBetRequest"     │  ← handler lookup key
//! │ transaction: "T42"                   │  ← scope opened by the peer
//! │ ┌──────────────────────────────────┐ │
//! │ │ body: [...encoded bytes...]      │ │
//! │ └──────────────────────────────────┘ │
//! └──────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    CategoryId, Channel, Codec, Message, MessageId, PayloadKind, ProtocolError,
    TransactionToken, VersionType,
};

// ---------------------------------------------------------------------------
// Envelope: typed, built by categories
// ---------------------------------------------------------------------------

/// Exactly one request, reply, or notification body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<M> {
    /// A body that expects a reply.
    Request(M),
    /// A body answering a request.
    Reply(M),
    /// A fire-and-forget body.
    Notification(M),
}

impl<M> Payload<M> {
    /// Returns the payload shape.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Request(_) => PayloadKind::Request,
            Self::Reply(_) => PayloadKind::Reply,
            Self::Notification(_) => PayloadKind::Notification,
        }
    }

    /// Borrows the body.
    pub fn message(&self) -> &M {
        match self {
            Self::Request(m) | Self::Reply(m) | Self::Notification(m) => m,
        }
    }

    /// Takes the body out.
    pub fn into_message(self) -> M {
        match self {
            Self::Request(m) | Self::Reply(m) | Self::Notification(m) => m,
        }
    }
}

/// A category-tagged container for one payload.
///
/// Built fresh for every call or response and consumed when it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<M> {
    /// The namespace the body belongs to.
    pub category: CategoryId,
    /// The sending category's effective version.
    pub version: VersionType,
    /// The body.
    pub payload: Payload<M>,
}

impl<M> Envelope<M> {
    /// Returns the payload shape.
    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    /// Borrows the body.
    pub fn message(&self) -> &M {
        self.payload.message()
    }
}

impl<M: Message> Envelope<M> {
    /// Flattens the envelope into a frame, encoding the body with `codec`.
    ///
    /// The returned frame has id `M-0`, no channel preference and no
    /// correlation; the session fills those in when it sends.
    pub fn to_frame<C: Codec>(&self, codec: &C) -> Result<Frame, ProtocolError> {
        Ok(Frame {
            id: MessageId(0),
            in_reply_to: None,
            channel: Channel::default(),
            category: self.category,
            version: self.version,
            kind: self.kind(),
            message_type: M::MESSAGE_TYPE.to_string(),
            transaction: None,
            body: codec.encode(self.message())?,
        })
    }
}

// ---------------------------------------------------------------------------
// Frame: untyped, what travels on the wire
// ---------------------------------------------------------------------------

/// The top-level wire unit. Every message on a connection is a `Frame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Assigned by the sending session.
    pub id: MessageId,

    /// For replies: the id of the request being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<MessageId>,

    /// Logical destination.
    #[serde(default)]
    pub channel: Channel,

    /// Owning category.
    pub category: CategoryId,

    /// The sender's effective version for `category`.
    pub version: VersionType,

    /// Payload shape.
    pub kind: PayloadKind,

    /// Wire name of the body type.
    pub message_type: String,

    /// Transaction scope opened by the sender for this frame, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<TransactionToken>,

    /// The encoded body.
    pub body: Vec<u8>,
}

impl Frame {
    /// Returns `true` if the frame's body is of type `M`.
    pub fn carries<M: Message>(&self) -> bool {
        self.message_type == M::MESSAGE_TYPE
    }

    /// Decodes the body as `M`.
    ///
    /// # Errors
    /// [`ProtocolError::MessageTypeMismatch`] if the header names a
    /// different type; a decode error if the bytes don't parse.
    pub fn decode_body<M: Message, C: Codec>(&self, codec: &C) -> Result<M, ProtocolError> {
        if !self.carries::<M>() {
            return Err(ProtocolError::MessageTypeMismatch {
                expected: M::MESSAGE_TYPE,
                actual: self.message_type.clone(),
            });
        }
        codec.decode(&self.body)
    }

    /// Rebuilds the typed envelope this frame was flattened from.
    pub fn to_envelope<M: Message, C: Codec>(
        &self,
        codec: &C,
    ) -> Result<Envelope<M>, ProtocolError> {
        let message = self.decode_body::<M, C>(codec)?;
        let payload = match self.kind {
            PayloadKind::Request => Payload::Request(message),
            PayloadKind::Reply => Payload::Reply(message),
            PayloadKind::Notification => Payload::Notification(message),
        };
        Ok(Envelope {
            category: self.category,
            version: self.version,
            payload,
        })
    }
}
