//! Capability traits a concrete category implements, and the glue that
//! routes a transport's inbound frames into a category's handler table.

use std::sync::{Arc, Weak};

use f2l_protocol::{Envelope, Frame, HasTransactionId, Message};

use crate::{CategoryCore, CategoryError, HandlerTable, InboundHandler, Transport};

/// A message namespace with its own handlers, version and gating.
///
/// A concrete category is a struct holding a [`CategoryCore`] and a
/// [`HandlerTable`] of itself. It composes further capabilities by also
/// implementing [`Transactional`] and/or
/// [`VersionNegotiable`](crate::VersionNegotiable).
pub trait Category: Sized + Send + Sync + 'static {
    /// The link this category talks over.
    type Transport: Transport;

    /// Shared category machinery.
    fn core(&self) -> &CategoryCore<Self::Transport>;

    /// Inbound handlers, filled at construction.
    fn handlers(&self) -> &HandlerTable<Self>;

    /// Dispatches one inbound frame to this category's handlers.
    fn handle_inbound(&self, frame: &Frame) -> Result<(), CategoryError> {
        self.handlers().dispatch(self, frame)
    }
}

/// A category whose requests carry the active transaction token.
pub trait Transactional: Category {
    /// Wraps `request` in a request envelope after stamping it with the
    /// transaction token the transport reports right now.
    ///
    /// Every transactional operation builds its request through here; a
    /// request built any other way goes out with whatever token it was
    /// constructed with.
    fn create_transactional_request<R>(&self, mut request: R) -> Envelope<R>
    where
        R: Message + HasTransactionId,
    {
        let core = self.core();
        request.set_transaction_id(core.transport().current_transaction_token());
        core.create_basic_request(request)
    }
}

/// Routes a transport's inbound frames to a category.
///
/// Holds the category weakly: the transport must not keep a category
/// alive after its owner has dropped it.
struct Dispatcher<S> {
    category: Weak<S>,
}

impl<S: Category> InboundHandler for Dispatcher<S> {
    fn handle(&self, frame: &Frame) -> Result<(), CategoryError> {
        match self.category.upgrade() {
            Some(category) => category.handle_inbound(frame),
            None => Err(CategoryError::InvalidOperation(format!(
                "{} was dropped before {} arrived",
                frame.category, frame.message_type
            ))),
        }
    }
}

/// Registers every message type in `category`'s handler table with its
/// transport.
///
/// Call once, right after the category is built.
///
/// # Errors
/// [`CategoryError::DuplicateHandler`] if another category already claimed
/// one of the routes.
pub fn register<S: Category>(category: &Arc<S>) -> Result<(), CategoryError> {
    let handler: Arc<dyn InboundHandler> = Arc::new(Dispatcher {
        category: Arc::downgrade(category),
    });
    let core = category.core();
    for message_type in category.handlers().message_types() {
        core.transport()
            .register_handler(core.id(), message_type, Arc::clone(&handler))?;
    }
    tracing::debug!(
        category = %core.id(),
        routes = category.handlers().len(),
        "category registered"
    );
    Ok(())
}
