//! Voucher printer events. Inbound only.

use std::sync::Arc;

use f2l_category::{
    Category, CategoryCore, CategoryError, HandlerTable, Inbound, MethodAvailabilityTable,
    Transport, VersionState, register,
};
use f2l_protocol::{CategoryId, VersionType};

use crate::messages::voucher_print::{VoucherPrintEvent, VoucherPrintNotification};

pub const VERSION: VersionType = VersionType::new(1, 0);

/// What the Logic does when the voucher printer reports progress.
pub trait VoucherPrintCallbacks: Send + Sync + 'static {
    fn process_voucher_print_event(&self, event: VoucherPrintEvent);
}

/// The voucher print category.
pub struct VoucherPrint<T: Transport> {
    core: CategoryCore<T>,
    handlers: HandlerTable<Self>,
    callbacks: Arc<dyn VoucherPrintCallbacks>,
}

impl<T: Transport> Category for VoucherPrint<T> {
    type Transport = T;

    fn core(&self) -> &CategoryCore<T> {
        &self.core
    }

    fn handlers(&self) -> &HandlerTable<Self> {
        &self.handlers
    }
}

impl<T: Transport> VoucherPrint<T> {
    pub fn new(
        transport: Arc<T>,
        callbacks: Arc<dyn VoucherPrintCallbacks>,
    ) -> Result<Arc<Self>, CategoryError> {
        let core = CategoryCore::new(
            CategoryId::VoucherPrint,
            transport,
            VersionState::fixed(VERSION),
            MethodAvailabilityTable::new(),
        )?;

        let mut handlers = HandlerTable::new(CategoryId::VoucherPrint);
        handlers.add_message_handler(
            |this: &Self, inbound: Inbound<VoucherPrintNotification>| {
                tracing::debug!(event = ?inbound.message.event, "voucher print event");
                this.callbacks
                    .process_voucher_print_event(inbound.message.event);
                Ok(())
            },
        )?;

        let category = Arc::new(Self {
            core,
            handlers,
            callbacks,
        });
        register(&category)?;
        Ok(category)
    }
}
