//! The session: one Foundation connection shared by every category.
//!
//! ```text
//!            send / send_and_await_reply           (any task)
//!                        │ encode, assign id
//!                        ▼
//!               ┌─ outbound queue ─┐
//!               │  (unbounded)     │──→ writer task ──→ Connection::send
//!               └──────────────────┘
//!
//!  Connection::recv ──→ reader task ──→ decode Frame
//!                                          │
//!                   Reply + pending id? ───┼──→ oneshot → awaiting caller
//!                                          │
//!                       everything else ───┴──→ route (category, type)
//!                                               → InboundHandler::handle
//! ```
//!
//! Handlers run on the reader task one at a time, in arrival order. A
//! handler can reply through [`Transport::send`] because sending only
//! enqueues. It must not await a reply of its own: the reader is the task
//! that would deliver it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use f2l_category::{CategoryError, InboundHandler, Transport};
use f2l_protocol::{
    CategoryId, Channel, Codec, Frame, JsonCodec, MessageId, PayloadKind, TransactionToken,
};
use f2l_transport::{Connection, ConnectionId, TransportError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::SessionConfig;
use crate::transaction::{ActiveTransactions, TransactionScope, generate_token, lock};

type Routes = HashMap<CategoryId, HashMap<&'static str, Arc<dyn InboundHandler>>>;

/// Requests waiting for their reply. `None` once the session has closed,
/// so a late caller can't park a waiter nobody will ever complete.
type Pending = Option<HashMap<MessageId, oneshot::Sender<Frame>>>;

/// A running session over one connection.
///
/// Created with [`Session::start`], which spawns the reader and writer
/// tasks and hands back an `Arc` to share between categories.
pub struct Session<K: Codec = JsonCodec> {
    connection_id: ConnectionId,
    codec: K,
    config: SessionConfig,
    next_id: AtomicU64,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    queued: Arc<AtomicUsize>,
    pending: Mutex<Pending>,
    routes: Mutex<Routes>,
    transactions: Mutex<ActiveTransactions>,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<K: Codec> Session<K> {
    /// Starts a session over `connection`.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn start<C: Connection>(connection: C, codec: K, config: SessionConfig) -> Arc<Self> {
        let connection = Arc::new(connection);
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let queued = Arc::new(AtomicUsize::new(0));

        let session = Arc::new(Self {
            connection_id: connection.id(),
            codec,
            config,
            next_id: AtomicU64::new(1),
            outbound,
            queued: Arc::clone(&queued),
            pending: Mutex::new(Some(HashMap::new())),
            routes: Mutex::new(HashMap::new()),
            transactions: Mutex::new(ActiveTransactions::default()),
            shutdown,
            tasks: Mutex::new(Vec::new()),
        });

        let writer = tokio::spawn(write_loop(
            Arc::clone(&connection),
            outbound_rx,
            queued,
            shutdown_rx.clone(),
        ));
        let reader = tokio::spawn(read_loop(
            connection,
            Arc::downgrade(&session),
            shutdown_rx,
        ));
        lock(&session.tasks).extend([writer, reader]);

        tracing::info!(connection = %session.connection_id, "session started");
        session
    }

    /// The connection this session runs over.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// The session's configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns `true` once the session has closed, locally or by the peer.
    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Number of requests still waiting for a reply.
    pub fn pending_requests(&self) -> usize {
        lock(&self.pending).as_ref().map_or(0, HashMap::len)
    }

    /// Opens a transaction scope with a freshly generated token.
    pub fn begin_transaction(&self) -> TransactionScope<'_> {
        TransactionScope::open(&self.transactions, generate_token())
    }

    /// Opens a transaction scope with a token the peer chose.
    pub fn enter_transaction(&self, token: TransactionToken) -> TransactionScope<'_> {
        TransactionScope::open(&self.transactions, token)
    }

    /// Closes the session.
    ///
    /// Waiting callers fail with a closed-connection error, routes are
    /// dropped, queued frames are flushed and the connection is closed.
    /// Safe to call more than once.
    pub async fn close(&self) {
        self.teardown("closed locally");
        let tasks: Vec<_> = lock(&self.tasks).drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(connection = %self.connection_id, error = %e, "session task failed");
            }
        }
    }

    fn teardown(&self, reason: &str) {
        let was_open = !self.shutdown.send_replace(true);
        let abandoned = lock(&self.pending).take().map_or(0, |p| p.len());
        lock(&self.routes).clear();
        if was_open {
            tracing::info!(
                connection = %self.connection_id,
                reason,
                abandoned,
                "session closed"
            );
        }
    }

    fn next_message_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn enqueue(&self, frame: &Frame) -> Result<(), CategoryError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed("session closed".into()).into());
        }
        let bytes = self.codec.encode(frame)?;

        let depth = self.queued.fetch_add(1, Ordering::Relaxed) + 1;
        if self.outbound.send(bytes).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
            return Err(TransportError::ConnectionClosed("writer stopped".into()).into());
        }
        if depth > self.config.outbound_warn_depth {
            tracing::warn!(connection = %self.connection_id, depth, "outbound queue backing up");
        }
        Ok(())
    }

    fn deliver(&self, bytes: &[u8]) {
        let frame: Frame = match self.codec.decode(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(
                    connection = %self.connection_id,
                    error = %e,
                    "dropping undecodable frame"
                );
                return;
            }
        };

        if frame.kind == PayloadKind::Reply {
            if let Some(request_id) = frame.in_reply_to {
                let waiter = lock(&self.pending)
                    .as_mut()
                    .and_then(|pending| pending.remove(&request_id));
                if let Some(waiter) = waiter {
                    // The caller may have timed out in the meantime.
                    let _ = waiter.send(frame);
                    return;
                }
            }
        }

        let handler = lock(&self.routes)
            .get(&frame.category)
            .and_then(|types| types.get(frame.message_type.as_str()))
            .cloned();

        let result = match handler {
            Some(handler) => {
                let _scope = frame.transaction.clone().map(|t| self.enter_transaction(t));
                handler.handle(&frame)
            }
            None => Err(CategoryError::UnhandledReplyType {
                category: frame.category,
                kind: frame.kind,
                message_type: frame.message_type.clone(),
            }),
        };

        if let Err(e) = result {
            tracing::warn!(
                connection = %self.connection_id,
                id = %frame.id,
                error = %e,
                "inbound frame not handled"
            );
        }
    }
}

impl<K: Codec> Transport for Session<K> {
    type Codec = K;

    fn codec(&self) -> &K {
        &self.codec
    }

    fn send(&self, channel: Channel, mut frame: Frame) -> Result<(), CategoryError> {
        frame.id = self.next_message_id();
        frame.channel = channel;
        self.enqueue(&frame)
    }

    async fn send_and_await_reply(
        &self,
        channel: Channel,
        mut frame: Frame,
    ) -> Result<Frame, CategoryError> {
        let id = self.next_message_id();
        frame.id = id;
        frame.channel = channel;

        let (tx, rx) = oneshot::channel();
        match lock(&self.pending).as_mut() {
            Some(pending) => pending.insert(id, tx),
            None => return Err(TransportError::ConnectionClosed("session closed".into()).into()),
        };
        // Removes the pending entry however this call ends, including when
        // the caller drops the future before a reply arrives.
        let _waiting = PendingReply { session: self, id };

        self.enqueue(&frame)?;

        let timeout = self.config.reply_timeout();
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(TransportError::ConnectionClosed(
                "session closed while awaiting reply".into(),
            )
            .into()),
            Err(_) => {
                tracing::warn!(
                    connection = %self.connection_id,
                    %id,
                    message_type = %frame.message_type,
                    "reply timed out"
                );
                Err(TransportError::Timeout(timeout).into())
            }
        }
    }

    fn register_handler(
        &self,
        category: CategoryId,
        message_type: &'static str,
        handler: Arc<dyn InboundHandler>,
    ) -> Result<(), CategoryError> {
        let mut routes = lock(&self.routes);
        let types = routes.entry(category).or_default();
        if types.contains_key(message_type) {
            return Err(CategoryError::DuplicateHandler {
                category,
                message_type: message_type.to_string(),
            });
        }
        types.insert(message_type, handler);
        tracing::debug!(%category, message_type, "route registered");
        Ok(())
    }

    fn current_transaction_token(&self) -> TransactionToken {
        lock(&self.transactions).current()
    }
}

/// An outstanding request's slot in the pending table.
struct PendingReply<'a, K: Codec> {
    session: &'a Session<K>,
    id: MessageId,
}

impl<K: Codec> Drop for PendingReply<'_, K> {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.session.pending).as_mut() {
            pending.remove(&self.id);
        }
    }
}

async fn write_loop<C: Connection>(
    connection: Arc<C>,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
    queued: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        // Drain what is queued before honouring shutdown.
        let bytes = tokio::select! {
            biased;
            next = outbound.recv() => match next {
                Some(bytes) => bytes,
                None => break,
            },
            _ = shutdown.changed() => break,
        };
        queued.fetch_sub(1, Ordering::Relaxed);

        if let Err(e) = connection.send(&bytes).await {
            tracing::warn!(connection = %connection.id(), error = %e, "write failed");
            break;
        }
    }

    if let Err(e) = connection.close().await {
        tracing::debug!(connection = %connection.id(), error = %e, "close failed");
    }
    tracing::debug!(connection = %connection.id(), "writer stopped");
}

async fn read_loop<C: Connection, K: Codec>(
    connection: Arc<C>,
    session: Weak<Session<K>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let reason = loop {
        let received = tokio::select! {
            _ = shutdown.changed() => break "closed locally",
            received = connection.recv() => received,
        };
        let bytes = match received {
            Ok(Some(bytes)) => bytes,
            Ok(None) => break "peer closed",
            Err(e) => {
                tracing::warn!(connection = %connection.id(), error = %e, "read failed");
                break "read failed";
            }
        };
        match session.upgrade() {
            Some(session) => session.deliver(&bytes),
            None => break "session dropped",
        }
    };

    if let Some(session) = session.upgrade() {
        session.teardown(reason);
    }
    tracing::debug!(connection = %connection.id(), reason, "reader stopped");
}
