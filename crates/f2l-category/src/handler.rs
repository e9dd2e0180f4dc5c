//! Inbound dispatch table.

use std::collections::HashMap;
use std::fmt;

use f2l_protocol::{
    CategoryId, Channel, Frame, Message, MessageId, PayloadKind, TransactionToken, VersionType,
};

use crate::{Category, CategoryError};

/// A decoded inbound request or notification, as seen by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound<M> {
    /// Frame id; a reply must name it.
    pub id: MessageId,
    /// Channel the frame arrived on; replies go back on it.
    pub channel: Channel,
    /// The sender's version for this category.
    pub version: VersionType,
    /// Request or notification.
    pub kind: PayloadKind,
    /// Transaction scope the sender opened for this frame.
    pub transaction: Option<TransactionToken>,
    /// The body.
    pub message: M,
}

impl<M> Inbound<M> {
    /// Returns `true` if the sender expects a reply.
    pub fn expects_reply(&self) -> bool {
        self.kind == PayloadKind::Request
    }
}

type ErasedHandler<S> = Box<dyn Fn(&S, &Frame) -> Result<(), CategoryError> + Send + Sync>;

/// Maps inbound message types to handlers for one category.
///
/// Filled during the owning category's construction and never changed
/// afterwards. A second registration for the same message type is an
/// error; nothing is ever overwritten.
pub struct HandlerTable<S> {
    category: CategoryId,
    handlers: HashMap<&'static str, ErasedHandler<S>>,
}

impl<S> HandlerTable<S> {
    /// An empty table for `category`.
    pub fn new(category: CategoryId) -> Self {
        Self {
            category,
            handlers: HashMap::new(),
        }
    }

    /// The category this table belongs to.
    pub fn category(&self) -> CategoryId {
        self.category
    }

    /// Wire names of every handled message type.
    pub fn message_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Returns `true` if `message_type` has a handler.
    pub fn contains(&self, message_type: &str) -> bool {
        self.handlers.contains_key(message_type)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn unhandled(&self, frame: &Frame) -> CategoryError {
        CategoryError::UnhandledReplyType {
            category: self.category,
            kind: frame.kind,
            message_type: frame.message_type.clone(),
        }
    }
}

impl<S: Category> HandlerTable<S> {
    /// Registers `handler` for inbound requests and notifications of type `M`.
    ///
    /// # Errors
    /// [`CategoryError::DuplicateHandler`] if `M` already has a handler;
    /// the existing one is kept.
    pub fn add_message_handler<M, F>(&mut self, handler: F) -> Result<(), CategoryError>
    where
        M: Message,
        F: Fn(&S, Inbound<M>) -> Result<(), CategoryError> + Send + Sync + 'static,
    {
        if self.handlers.contains_key(M::MESSAGE_TYPE) {
            return Err(CategoryError::DuplicateHandler {
                category: self.category,
                message_type: M::MESSAGE_TYPE.to_string(),
            });
        }

        let erased = move |owner: &S, frame: &Frame| {
            let inbound = owner.core().decode_inbound::<M>(frame)?;
            handler(owner, inbound)
        };
        self.handlers.insert(M::MESSAGE_TYPE, Box::new(erased));
        Ok(())
    }

    /// Runs the handler for `frame` on `owner`.
    ///
    /// # Errors
    /// [`CategoryError::UnhandledReplyType`] if the frame belongs to another
    /// category, is a reply (replies are correlated by the transport, never
    /// dispatched), or has no handler. The table is not modified.
    pub fn dispatch(&self, owner: &S, frame: &Frame) -> Result<(), CategoryError> {
        if frame.category != self.category || frame.kind == PayloadKind::Reply {
            return Err(self.unhandled(frame));
        }
        match self.handlers.get(frame.message_type.as_str()) {
            Some(handler) => {
                tracing::debug!(
                    category = %self.category,
                    message_type = %frame.message_type,
                    id = %frame.id,
                    "dispatching inbound frame"
                );
                handler(owner, frame)
            }
            None => Err(self.unhandled(frame)),
        }
    }
}

impl<S> fmt::Debug for HandlerTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("category", &self.category)
            .field("message_types", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
