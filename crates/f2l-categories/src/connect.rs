//! Connection set-up: per-category version negotiation and the
//! Foundation's park/shutdown commands.
//!
//! Connect itself runs at a fixed version. At start-up the Logic offers
//! the supported versions of every negotiable category it was given; the
//! Foundation answers with one pick per category and each pick is applied
//! through [`VersionNegotiable::set_version`].

use std::sync::Arc;

use f2l_category::{
    Category, CategoryCore, CategoryError, HandlerTable, Inbound, MethodAvailabilityTable,
    Transport, VersionNegotiable, VersionState, register,
};
use f2l_protocol::{CategoryId, Channel, VersionType};

use crate::messages::connect::{
    CategoryVersion, CategoryVersions, NegotiateVersionsReply, NegotiateVersionsRequest,
    ParkReply, ParkRequest, ShutdownNotification,
};
use crate::reply_code;

/// The version Connect always runs at.
pub const VERSION: VersionType = VersionType::new(1, 0);

/// What the Logic does when the Foundation parks or shuts it down.
pub trait ConnectCallbacks: Send + Sync + 'static {
    /// Go idle. Returning `Err` refuses; the reason goes back to the
    /// Foundation.
    fn process_park(&self) -> Result<(), String>;

    /// The Foundation is going away.
    fn process_shutdown(&self, reason: &str);
}

/// The connect category.
pub struct Connect<T: Transport> {
    core: CategoryCore<T>,
    handlers: HandlerTable<Self>,
    callbacks: Arc<dyn ConnectCallbacks>,
    negotiables: Vec<Arc<dyn VersionNegotiable>>,
}

impl<T: Transport> Category for Connect<T> {
    type Transport = T;

    fn core(&self) -> &CategoryCore<T> {
        &self.core
    }

    fn handlers(&self) -> &HandlerTable<Self> {
        &self.handlers
    }
}

impl<T: Transport> Connect<T> {
    /// Builds the category. `negotiables` are the categories whose version
    /// [`negotiate`](Self::negotiate) settles.
    pub fn new(
        transport: Arc<T>,
        callbacks: Arc<dyn ConnectCallbacks>,
        negotiables: Vec<Arc<dyn VersionNegotiable>>,
    ) -> Result<Arc<Self>, CategoryError> {
        let core = CategoryCore::new(
            CategoryId::Connect,
            transport,
            VersionState::fixed(VERSION),
            MethodAvailabilityTable::new(),
        )?;

        let mut handlers = HandlerTable::new(CategoryId::Connect);
        handlers.add_message_handler(|this: &Self, inbound: Inbound<ParkRequest>| {
            let (code, reason) = reply_code(this.callbacks.process_park());
            let reply = this.core.create_reply(ParkReply::default(), code, &reason);
            this.core.send_reply(inbound.channel, inbound.id, reply)
        })?;
        handlers.add_message_handler(|this: &Self, inbound: Inbound<ShutdownNotification>| {
            tracing::info!(reason = %inbound.message.reason, "foundation shutting down");
            this.callbacks.process_shutdown(&inbound.message.reason);
            Ok(())
        })?;

        let category = Arc::new(Self {
            core,
            handlers,
            callbacks,
            negotiables,
        });
        register(&category)?;
        Ok(category)
    }

    /// Negotiates a version for every negotiable category.
    ///
    /// Returns the Foundation's selections, all of them applied. A
    /// category the Foundation leaves out stays unnegotiated.
    ///
    /// # Errors
    /// - [`CategoryError::InvalidOperation`] if a selection names a
    ///   category that was not offered.
    /// - [`CategoryError::UnsupportedVersion`] if a selection is outside
    ///   what the category offered.
    ///
    /// Selections before the failing one stay applied.
    pub async fn negotiate(&self) -> Result<Vec<CategoryVersion>, CategoryError> {
        let offered = self
            .negotiables
            .iter()
            .map(|n| CategoryVersions {
                category: n.category_id(),
                versions: n.supported_versions().to_vec(),
            })
            .collect();
        let request = self
            .core
            .create_basic_request(NegotiateVersionsRequest { offered });
        let reply: NegotiateVersionsReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;

        for selection in &reply.selected {
            let negotiable = self
                .negotiables
                .iter()
                .find(|n| n.category_id() == selection.category)
                .ok_or_else(|| {
                    CategoryError::InvalidOperation(format!(
                        "foundation selected {} for {}, which was not offered",
                        selection.version, selection.category
                    ))
                })?;
            negotiable.set_version(selection.version.major, selection.version.minor)?;
        }

        for negotiable in &self.negotiables {
            if !negotiable.version().is_negotiated() {
                tracing::warn!(category = %negotiable.category_id(), "left unnegotiated");
            }
        }
        Ok(reply.selected)
    }
}
