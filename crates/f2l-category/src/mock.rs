//! In-process [`Transport`] for exercising categories without a session.
//!
//! Records everything sent, answers requests from a script, and lets a
//! test push inbound frames through the registered routes.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use f2l_protocol::{
    CategoryId, Channel, Codec, Frame, JsonCodec, Message, MessageId, PayloadKind,
    TransactionToken, VersionType,
};
use f2l_transport::TransportError;

use crate::{CategoryError, InboundHandler, Transport};

enum Scripted {
    Reply { message_type: String, body: Vec<u8> },
    Raw(Frame),
}

type Routes = HashMap<(CategoryId, &'static str), Arc<dyn InboundHandler>>;

/// A scripted transport using [`JsonCodec`].
#[derive(Default)]
pub struct MockTransport {
    codec: JsonCodec,
    next_id: AtomicU64,
    sent: Mutex<Vec<(Channel, Frame)>>,
    replies: Mutex<VecDeque<Scripted>>,
    routes: Mutex<Routes>,
    transaction: Mutex<TransactionToken>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    /// An empty transport with no script and no active transaction.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn next_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Queues `reply` as the answer to the next request. The reply frame
    /// echoes the request's category and version.
    pub fn push_reply<R: Message>(&self, reply: &R) {
        let body = self
            .codec
            .encode(reply)
            .unwrap_or_else(|e| panic!("mock reply must encode: {e}"));
        lock(&self.replies).push_back(Scripted::Reply {
            message_type: R::MESSAGE_TYPE.to_string(),
            body,
        });
    }

    /// Queues `frame` verbatim as the answer to the next request.
    pub fn push_raw_reply(&self, frame: Frame) {
        lock(&self.replies).push_back(Scripted::Raw(frame));
    }

    /// Sets the token reported by `current_transaction_token`.
    pub fn set_transaction(&self, token: impl Into<TransactionToken>) {
        *lock(&self.transaction) = token.into();
    }

    /// Everything sent so far, requests included, in order.
    pub fn sent(&self) -> Vec<(Channel, Frame)> {
        lock(&self.sent).clone()
    }

    /// Number of frames sent so far.
    pub fn sent_count(&self) -> usize {
        lock(&self.sent).len()
    }

    /// The most recent frame sent, if any.
    pub fn last_sent(&self) -> Option<(Channel, Frame)> {
        lock(&self.sent).last().cloned()
    }

    /// Decodes the body of the most recent frame as `M`.
    pub fn last_sent_body<M: Message>(&self) -> Option<M> {
        let (_, frame) = self.last_sent()?;
        frame.decode_body(&self.codec).ok()
    }

    /// Returns `true` if a route exists for `message_type` in `category`.
    pub fn has_route(&self, category: CategoryId, message_type: &str) -> bool {
        lock(&self.routes)
            .keys()
            .any(|(c, t)| *c == category && *t == message_type)
    }

    /// Builds an inbound frame carrying `message`.
    pub fn inbound<M: Message>(
        &self,
        category: CategoryId,
        kind: PayloadKind,
        message: &M,
    ) -> Frame {
        let body = self
            .codec
            .encode(message)
            .unwrap_or_else(|e| panic!("mock inbound must encode: {e}"));
        Frame {
            id: self.next_id(),
            in_reply_to: None,
            channel: Channel::Foundation,
            category,
            version: VersionType::new(1, 0),
            kind,
            message_type: M::MESSAGE_TYPE.to_string(),
            transaction: None,
            body,
        }
    }

    /// Delivers `frame` through the registered routes, as a session's
    /// reader would.
    pub fn deliver(&self, frame: &Frame) -> Result<(), CategoryError> {
        let handler = lock(&self.routes)
            .iter()
            .find(|((c, t), _)| *c == frame.category && *t == frame.message_type)
            .map(|(_, h)| Arc::clone(h));
        match handler {
            Some(handler) => handler.handle(frame),
            None => Err(CategoryError::UnhandledReplyType {
                category: frame.category,
                kind: frame.kind,
                message_type: frame.message_type.clone(),
            }),
        }
    }
}

impl Transport for MockTransport {
    type Codec = JsonCodec;

    fn codec(&self) -> &JsonCodec {
        &self.codec
    }

    fn send(&self, channel: Channel, mut frame: Frame) -> Result<(), CategoryError> {
        frame.id = self.next_id();
        lock(&self.sent).push((channel, frame));
        Ok(())
    }

    async fn send_and_await_reply(
        &self,
        channel: Channel,
        mut frame: Frame,
    ) -> Result<Frame, CategoryError> {
        frame.id = self.next_id();
        let request_id = frame.id;
        let (category, version) = (frame.category, frame.version);
        lock(&self.sent).push((channel, frame));

        let scripted = lock(&self.replies).pop_front();
        match scripted {
            Some(Scripted::Reply { message_type, body }) => Ok(Frame {
                id: self.next_id(),
                in_reply_to: Some(request_id),
                channel,
                category,
                version,
                kind: PayloadKind::Reply,
                message_type,
                transaction: None,
                body,
            }),
            Some(Scripted::Raw(mut frame)) => {
                frame.in_reply_to = Some(request_id);
                Ok(frame)
            }
            None => Err(TransportError::ConnectionClosed("no scripted reply".into()).into()),
        }
    }

    fn register_handler(
        &self,
        category: CategoryId,
        message_type: &'static str,
        handler: Arc<dyn InboundHandler>,
    ) -> Result<(), CategoryError> {
        let mut routes = lock(&self.routes);
        if routes.contains_key(&(category, message_type)) {
            return Err(CategoryError::DuplicateHandler {
                category,
                message_type: message_type.to_string(),
            });
        }
        routes.insert((category, message_type), handler);
        Ok(())
    }

    fn current_transaction_token(&self) -> TransactionToken {
        lock(&self.transaction).clone()
    }
}
