//! Identity and header types that travel on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a category's message namespace on a shared connection.
///
/// Two categories may both define a message named `StatusRequest`; the
/// category id is what keeps them apart. Ids are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryId {
    /// Betting and game-cycle control.
    GameControl,
    /// Connection set-up and per-category version negotiation.
    Connect,
    /// Auto-play control.
    AutoPlay,
    /// Voucher printer events.
    VoucherPrint,
    /// Wide-area progressive sign control.
    WapSign,
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GameControl => "GameControl",
            Self::Connect => "Connect",
            Self::AutoPlay => "AutoPlay",
            Self::VoucherPrint => "VoucherPrint",
            Self::WapSign => "WapSign",
        };
        f.write_str(name)
    }
}

/// Per-session identifier of a single frame.
///
/// Assigned by the sending session. A reply names the request it answers
/// through [`Frame::in_reply_to`](crate::Frame::in_reply_to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// Opaque token naming the transaction a request belongs to.
///
/// The empty token is the sentinel for "no transaction active"; the
/// Foundation decides whether an operation requires a real one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionToken(String);

impl TransactionToken {
    /// Wraps a token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The sentinel used when no transaction is active.
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Returns `true` for the "no transaction" sentinel.
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransactionToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl fmt::Display for TransactionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("<none>")
        } else {
            f.write_str(&self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// Channel: logical routing destination
// ---------------------------------------------------------------------------

/// The logical destination a frame is addressed to.
///
/// Channels are independent of categories: a category picks the channel
/// its traffic belongs on, and several categories share each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Channel {
    /// Platform-level traffic (money, game cycle, negotiation).
    #[default]
    Foundation,
    /// Presentation-level traffic (signage, attract content).
    Game,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Foundation => f.write_str("Foundation"),
            Self::Game => f.write_str("Game"),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload kind and reply status
// ---------------------------------------------------------------------------

/// Which of the three payload shapes a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadKind {
    /// Expects exactly one reply.
    Request,
    /// Answers a request.
    Reply,
    /// Fire-and-forget; nothing answers it.
    Notification,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Reply => f.write_str("reply"),
            Self::Notification => f.write_str("notification"),
        }
    }
}

/// Outcome carried by every reply: code 0 is success.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplyStatus {
    /// Zero on success, otherwise a category-defined error code.
    pub code: i32,
    /// Human-readable reason; only present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReplyStatus {
    /// A successful status.
    pub fn ok() -> Self {
        Self::default()
    }

    /// A failed status with a reason.
    pub fn error(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: Some(description.into()),
        }
    }

    /// Returns `true` when `code` is zero.
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}
