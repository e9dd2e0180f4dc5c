//! Game control bodies: betting and the game cycle.

use f2l_protocol::{ReplyStatus, TransactionToken, wire_message};
use serde::{Deserialize, Serialize};

/// Outcome of enrolling a game cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnrollResult {
    /// The Foundation accepted the enrollment.
    pub accepted: bool,
    /// The final answer arrives later as an [`EnrollResponseNotification`].
    pub response_pending: bool,
}

/// What the Logic proposes to award for the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Outcome {
    /// Credits won, before any Foundation limit.
    pub award_credits: u64,
}

/// What the Foundation made of a proposed [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutcomeAdjustment {
    /// Credits that will actually be paid.
    pub award_credits: u64,
    /// `true` if the award was reduced to fit a limit.
    pub capped: bool,
}

// ---------------------------------------------------------------------------
// Outbound requests and their replies
// ---------------------------------------------------------------------------

/// Commits the player's bet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitBetRequest {
    pub transaction_id: TransactionToken,
    pub bet: u64,
    pub denomination: u32,
}
wire_message!(CommitBetRequest, transaction);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitBetReply {
    pub status: ReplyStatus,
    pub committed: bool,
}
wire_message!(CommitBetReply, status);

/// Asks to start a game cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollGameCycleRequest {
    pub transaction_id: TransactionToken,
}
wire_message!(EnrollGameCycleRequest, transaction);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollGameCycleReply {
    pub status: ReplyStatus,
    pub result: EnrollResult,
}
wire_message!(EnrollGameCycleReply, status);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartPlayingRequest {
    pub transaction_id: TransactionToken,
}
wire_message!(StartPlayingRequest, transaction);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartPlayingReply {
    pub status: ReplyStatus,
    pub started: bool,
}
wire_message!(StartPlayingReply, status);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjustOutcomeRequest {
    pub transaction_id: TransactionToken,
    pub outcome: Outcome,
}
wire_message!(AdjustOutcomeRequest, transaction);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjustOutcomeReply {
    pub status: ReplyStatus,
    pub adjustment: OutcomeAdjustment,
}
wire_message!(AdjustOutcomeReply, status);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinalizeOutcomeRequest {
    pub transaction_id: TransactionToken,
}
wire_message!(FinalizeOutcomeRequest, transaction);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinalizeOutcomeReply {
    pub status: ReplyStatus,
    pub finalized: bool,
}
wire_message!(FinalizeOutcomeReply, status);

/// Closes the cycle, recording how many history steps it produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndGameCycleRequest {
    pub transaction_id: TransactionToken,
    pub history_steps: u32,
}
wire_message!(EndGameCycleRequest, transaction);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndGameCycleReply {
    pub status: ReplyStatus,
    pub ended: bool,
}
wire_message!(EndGameCycleReply, status);

/// Since 1.1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetDenominationMenuRequest {
    pub transaction_id: TransactionToken,
}
wire_message!(GetDenominationMenuRequest, transaction);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetDenominationMenuReply {
    pub status: ReplyStatus,
    pub denominations: Vec<u32>,
}
wire_message!(GetDenominationMenuReply, status);

/// Since 1.1. Fire-and-forget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameProgressNotification {
    pub step: u32,
}
wire_message!(GameProgressNotification);

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// The Foundation switched the player-facing language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeCultureRequest {
    pub culture: String,
}
wire_message!(ChangeCultureRequest);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeCultureReply {
    pub status: ReplyStatus,
}
wire_message!(ChangeCultureReply, status);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetCommittedNotification {
    pub bet: u64,
    pub denomination: u32,
}
wire_message!(BetCommittedNotification);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollResponseNotification {
    pub accepted: bool,
}
wire_message!(EnrollResponseNotification);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeResponseNotification {
    pub adjustment: OutcomeAdjustment,
}
wire_message!(OutcomeResponseNotification);
