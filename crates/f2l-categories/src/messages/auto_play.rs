use f2l_protocol::{ReplyStatus, wire_message};
use serde::{Deserialize, Serialize};

/// Auto-play limits set by the operator. Since 1.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutoPlayConfig {
    /// Games to play before stopping; 0 means no limit.
    pub max_games: u32,
    /// Stop when a feature triggers.
    pub stop_on_feature: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IsAutoPlayOnRequest {}
wire_message!(IsAutoPlayOnRequest);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IsAutoPlayOnReply {
    pub status: ReplyStatus,
    pub on: bool,
}
wire_message!(IsAutoPlayOnReply, status);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetAutoPlayOnRequest {
    pub on: bool,
}
wire_message!(SetAutoPlayOnRequest);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetAutoPlayOnReply {
    pub status: ReplyStatus,
    pub accepted: bool,
}
wire_message!(SetAutoPlayOnReply, status);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetAutoPlayConfigRequest {}
wire_message!(GetAutoPlayConfigRequest);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetAutoPlayConfigReply {
    pub status: ReplyStatus,
    pub config: AutoPlayConfig,
}
wire_message!(GetAutoPlayConfigReply, status);

/// The Foundation asks the Logic to start auto play.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoPlayOnRequest {}
wire_message!(AutoPlayOnRequest);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoPlayOnReply {
    pub status: ReplyStatus,
    pub accepted: bool,
}
wire_message!(AutoPlayOnReply, status);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoPlayOffNotification {}
wire_message!(AutoPlayOffNotification);
