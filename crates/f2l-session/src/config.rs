//! Session tuning knobs.

use std::time::Duration;

/// Configuration for a [`Session`](crate::Session).
///
/// Build with `SessionConfig::default()` and override the fields you care
/// about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a synchronous call waits for its reply before failing
    /// with a timeout.
    ///
    /// Default: 30 000 ms.
    pub reply_timeout_ms: u64,

    /// Queued outbound frames above which every enqueue logs a warning.
    /// The queue itself is unbounded.
    ///
    /// Default: 1024.
    pub outbound_warn_depth: usize,
}

impl SessionConfig {
    /// [`reply_timeout_ms`](Self::reply_timeout_ms) as a `Duration`.
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_timeout_ms: 30_000,
            outbound_warn_depth: 1024,
        }
    }
}
