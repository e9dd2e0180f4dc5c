//! Session runtime for F2L.
//!
//! A [`Session`] drives one Foundation connection on behalf of every
//! category sharing it. It implements
//! [`f2l_category::Transport`], which is all a category ever sees:
//!
//! 1. **Framing**: assigns message ids, encodes frames, queues them for
//!    a writer task.
//! 2. **Correlation**: parks synchronous callers until the reply naming
//!    their request arrives, or the configured timeout passes.
//! 3. **Delivery**: routes inbound requests and notifications by
//!    (category, message type) to registered handlers.
//! 4. **Transactions**: tracks the transaction token in force, set either
//!    by the peer on an inbound frame or locally through
//!    [`Session::begin_transaction`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Categories (above)  ← typed envelopes, handlers, version gating
//!     ↕  Transport trait
//! Session (this crate) ← ids, correlation, routing, transaction scope
//!     ↕  Connection trait
//! Transport (below)   ← WebSocket or in-memory bytes
//! ```

mod config;
mod session;
mod transaction;

pub use config::SessionConfig;
pub use session::Session;
pub use transaction::TransactionScope;
