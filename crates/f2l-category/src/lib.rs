//! Category layer for F2L.
//!
//! A *category* is a versioned message namespace (game control, auto play,
//! connection negotiation, ...) sharing one Foundation connection with
//! every other category. This crate holds what they all have in common:
//!
//! - [`CategoryCore`]: envelope construction, request/reply round trips,
//!   reply status checking, method gating.
//! - [`HandlerTable`]: inbound dispatch by message type.
//! - [`VersionState`] and [`VersionNegotiable`]: the per-session version
//!   state machine.
//! - [`MethodAvailabilityTable`]: which operations need a newer version.
//! - [`Transport`]: what a category needs from the session under it.
//!
//! # Composing a category
//!
//! ```text
//! struct GameControl ──impl──→ Category         (core + handlers)
//!                    ──impl──→ Transactional    (token-stamped requests)
//!                    ──impl──→ VersionNegotiable (per-session version)
//! ```
//!
//! Build the core and the handler table, wrap the struct in an `Arc`, then
//! call [`register`] so the transport routes inbound frames to it.

mod availability;
mod category;
mod error;
mod handler;
#[cfg(any(test, feature = "test-util"))]
mod mock;
mod shared;
mod transport;
mod version;

pub use availability::MethodAvailabilityTable;
pub use category::{Category, Transactional, register};
pub use error::CategoryError;
pub use handler::{HandlerTable, Inbound};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockTransport;
pub use shared::{CategoryCore, check_reply};
pub use transport::{InboundHandler, Transport};
pub use version::{VersionNegotiable, VersionState};
