//! The boundary between categories and whatever carries their frames.

use std::future::Future;
use std::sync::Arc;

use f2l_protocol::{CategoryId, Channel, Codec, Frame, TransactionToken};

use crate::CategoryError;

/// Receives inbound frames routed to a category.
///
/// Called synchronously on the transport's delivery path, one frame at a
/// time in arrival order. Implementations must return quickly: nothing
/// else is delivered on the connection while a handler runs.
pub trait InboundHandler: Send + Sync + 'static {
    /// Handles one frame, sending any reply before returning.
    fn handle(&self, frame: &Frame) -> Result<(), CategoryError>;
}

/// What a category needs from the link it talks over.
///
/// A transport owns frame ids, reply correlation and the current
/// transaction scope. Categories only build typed envelopes, flatten them
/// with [`codec`](Self::codec) and hand them over.
pub trait Transport: Send + Sync + 'static {
    /// Codec used for frame bodies on this link.
    type Codec: Codec;

    /// Returns the body codec.
    fn codec(&self) -> &Self::Codec;

    /// Queues a frame for sending without waiting for anything.
    ///
    /// Safe to call from an [`InboundHandler`].
    fn send(&self, channel: Channel, frame: Frame) -> Result<(), CategoryError>;

    /// Sends a request frame and resolves with the reply correlated to it.
    ///
    /// Fails with a transport error if the link closes or no reply arrives
    /// in time.
    fn send_and_await_reply(
        &self,
        channel: Channel,
        frame: Frame,
    ) -> impl Future<Output = Result<Frame, CategoryError>> + Send;

    /// Routes inbound frames of `message_type` in `category` to `handler`.
    ///
    /// # Errors
    /// [`CategoryError::DuplicateHandler`] if the route already exists.
    fn register_handler(
        &self,
        category: CategoryId,
        message_type: &'static str,
        handler: Arc<dyn InboundHandler>,
    ) -> Result<(), CategoryError>;

    /// The transaction active right now, or the empty sentinel.
    fn current_transaction_token(&self) -> TransactionToken;
}
