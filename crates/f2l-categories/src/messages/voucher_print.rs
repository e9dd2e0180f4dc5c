use f2l_protocol::wire_message;
use serde::{Deserialize, Serialize};

/// Printer progress reported by the Foundation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoucherPrintEvent {
    PrintInitiated,
    PrintCompleted,
    PrintFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherPrintNotification {
    pub event: VoucherPrintEvent,
}
wire_message!(VoucherPrintNotification);
