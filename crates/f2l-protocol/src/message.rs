//! Traits implemented by every message body.
//!
//! Bodies are plain serde structs. What makes one usable by a category is
//! [`Message`] (a stable wire name) plus, where applicable,
//! [`HasReplyStatus`] and [`HasTransactionId`]. Those two traits replace any
//! kind of runtime field lookup: a category that stamps a transaction id
//! on a body without the field simply does not compile.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ReplyStatus, TransactionToken};

/// A typed message body with a stable wire name.
pub trait Message: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The name carried in [`Frame::message_type`](crate::Frame::message_type).
    /// Unique within the owning category.
    const MESSAGE_TYPE: &'static str;
}

/// A reply body that carries a [`ReplyStatus`].
pub trait HasReplyStatus {
    /// Returns the status set by the replying peer.
    fn reply_status(&self) -> &ReplyStatus;

    /// Mutable access used when building a reply.
    fn reply_status_mut(&mut self) -> &mut ReplyStatus;
}

/// A request body with a reserved transaction field.
pub trait HasTransactionId {
    /// Returns the stamped token.
    fn transaction_id(&self) -> &TransactionToken;

    /// Stamps the token active when the request was built.
    fn set_transaction_id(&mut self, token: TransactionToken);
}

/// Implements [`Message`] (and optionally one of the field traits) for a
/// body struct, using the struct name as the wire name.
///
/// - `wire_message!(Foo)`: plain message.
/// - `wire_message!(Foo, status)`: also [`HasReplyStatus`] over a
///   `status: ReplyStatus` field.
/// - `wire_message!(Foo, transaction)`: also [`HasTransactionId`] over a
///   `transaction_id: TransactionToken` field.
#[macro_export]
macro_rules! wire_message {
    ($ty:ident) => {
        impl $crate::Message for $ty {
            const MESSAGE_TYPE: &'static str = stringify!($ty);
        }
    };
    ($ty:ident, status) => {
        $crate::wire_message!($ty);

        impl $crate::HasReplyStatus for $ty {
            fn reply_status(&self) -> &$crate::ReplyStatus {
                &self.status
            }

            fn reply_status_mut(&mut self) -> &mut $crate::ReplyStatus {
                &mut self.status
            }
        }
    };
    ($ty:ident, transaction) => {
        $crate::wire_message!($ty);

        impl $crate::HasTransactionId for $ty {
            fn transaction_id(&self) -> &$crate::TransactionToken {
                &self.transaction_id
            }

            fn set_transaction_id(&mut self, token: $crate::TransactionToken) {
                self.transaction_id = token;
            }
        }
    };
}
