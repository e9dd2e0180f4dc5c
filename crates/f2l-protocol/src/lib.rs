//! Wire protocol for F2L categories.
//!
//! This crate defines what travels between the Foundation and the Logic:
//!
//! - **Versions** ([`VersionType`]): the `major.minor` pair every category
//!   negotiates and stamps on its traffic.
//! - **Headers** ([`CategoryId`], [`Channel`], [`MessageId`],
//!   [`TransactionToken`], [`ReplyStatus`]).
//! - **Messages** ([`Message`], [`HasReplyStatus`], [`HasTransactionId`],
//!   [`wire_message!`]): what a body must implement.
//! - **Envelopes and frames** ([`Envelope`], [`Payload`], [`Frame`]).
//! - **Codec** ([`Codec`], [`JsonCodec`]) and [`ProtocolError`].
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Frame) → Category (typed Envelope<M>)
//! ```
//!
//! The protocol layer knows nothing about connections or handlers; it
//! only knows how frames and bodies are shaped and serialized.

mod codec;
mod envelope;
mod error;
mod message;
mod types;
mod version;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use envelope::{Envelope, Frame, Payload};
pub use error::ProtocolError;
pub use message::{HasReplyStatus, HasTransactionId, Message};
pub use types::{CategoryId, Channel, MessageId, PayloadKind, ReplyStatus, TransactionToken};
pub use version::VersionType;
