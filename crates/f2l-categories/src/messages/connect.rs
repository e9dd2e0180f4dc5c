//! Connection set-up bodies.

use f2l_protocol::{CategoryId, ReplyStatus, VersionType, wire_message};
use serde::{Deserialize, Serialize};

/// The versions the Logic can run one category at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVersions {
    pub category: CategoryId,
    /// Ascending.
    pub versions: Vec<VersionType>,
}

/// The version the Foundation picked for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVersion {
    pub category: CategoryId,
    pub version: VersionType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NegotiateVersionsRequest {
    pub offered: Vec<CategoryVersions>,
}
wire_message!(NegotiateVersionsRequest);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NegotiateVersionsReply {
    pub status: ReplyStatus,
    pub selected: Vec<CategoryVersion>,
}
wire_message!(NegotiateVersionsReply, status);

/// The Foundation wants the Logic idle (door open, tilt, operator menu).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParkRequest {}
wire_message!(ParkRequest);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParkReply {
    pub status: ReplyStatus,
}
wire_message!(ParkReply, status);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownNotification {
    pub reason: String,
}
wire_message!(ShutdownNotification);
