use f2l_protocol::{ReplyStatus, wire_message};
use serde::{Deserialize, Serialize};

/// What the wide-area progressive sign is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignState {
    pub text: String,
    pub online: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetSignTextNotification {
    pub text: String,
}
wire_message!(SetSignTextNotification);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetSignStateRequest {}
wire_message!(GetSignStateRequest);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetSignStateReply {
    pub status: ReplyStatus,
    pub state: SignState,
}
wire_message!(GetSignStateReply, status);
