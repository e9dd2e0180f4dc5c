//! # F2L
//!
//! Logic-side runtime for the Foundation-to-Logic (F2L) category protocol.
//!
//! A game Logic talks to its host platform (the Foundation) over a single
//! connection carrying several versioned *categories*: game control,
//! connection negotiation, auto play, and so on. This crate wires a
//! connection, a [`Session`](f2l_session::Session) and every category into
//! one [`LogicClient`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use f2l::prelude::*;
//!
//! struct Logic;
//!
//! impl GameControlCallbacks for Logic {
//!     fn process_culture_change(&self, _culture: &str) -> Result<(), String> {
//!         Ok(())
//!     }
//! }
//!
//! impl ConnectCallbacks for Logic {
//!     fn process_park(&self) -> Result<(), String> {
//!         Ok(())
//!     }
//!
//!     fn process_shutdown(&self, _reason: &str) {}
//! }
//!
//! # async fn run() -> Result<(), F2lError> {
//! let logic = Arc::new(Logic);
//! let client = LogicClient::builder()
//!     .game_control(logic.clone())
//!     .connect_callbacks(logic)
//!     .connect_websocket("ws://127.0.0.1:9100")
//!     .await?;
//! client.negotiate().await?;
//!
//! let _transaction = client.begin_transaction();
//! client.game_control().commit_bet(10, 1).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{LogicClient, LogicClientBuilder};
pub use error::F2lError;

pub use f2l_categories as categories;
pub use f2l_category as category;
pub use f2l_protocol as protocol;
pub use f2l_session as session;
pub use f2l_transport as transport;

/// Installs a `tracing` subscriber that prints to stderr.
///
/// Filtering follows `RUST_LOG`, falling back to `default_directives`
/// (e.g. `"info,f2l_session=debug"`). Returns `false` if a global
/// subscriber was already installed.
pub fn init_tracing(default_directives: &str) -> bool {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directives));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

/// Everything a Logic implementation usually needs.
pub mod prelude {
    pub use crate::{F2lError, LogicClient, LogicClientBuilder, init_tracing};

    pub use f2l_categories::messages::auto_play::AutoPlayConfig;
    pub use f2l_categories::messages::connect::CategoryVersion;
    pub use f2l_categories::messages::game_control::{
        BetCommittedNotification, EnrollResponseNotification, EnrollResult, Outcome,
        OutcomeAdjustment, OutcomeResponseNotification,
    };
    pub use f2l_categories::messages::voucher_print::VoucherPrintEvent;
    pub use f2l_categories::messages::wap_sign::SignState;
    pub use f2l_categories::{
        AutoPlayCallbacks, ConnectCallbacks, GameControlCallbacks, VoucherPrintCallbacks,
    };
    pub use f2l_category::{CategoryError, VersionNegotiable};
    pub use f2l_protocol::{CategoryId, VersionType};
    pub use f2l_session::SessionConfig;
}
