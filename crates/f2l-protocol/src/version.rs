//! Category protocol versions.
//!
//! Every category negotiates a `major.minor` version with the Foundation
//! and stamps it on every frame it sends. Versions are also the keys of
//! method gating: an operation introduced in 1.1 is unavailable to a
//! category that settled on 1.0.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `(major, minor)` protocol version.
///
/// Ordering is lexicographic: major first, then minor. The derived
/// `PartialOrd`/`Ord` give exactly that because `major` is declared first.
///
/// ```rust
/// use f2l_protocol::VersionType;
///
/// assert!(VersionType::new(2, 0) > VersionType::new(1, 9));
/// assert!(VersionType::new(1, 1) >= VersionType::new(1, 1));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VersionType {
    /// Incremented for incompatible changes.
    pub major: u32,
    /// Incremented when operations are added.
    pub minor: u32,
}

impl VersionType {
    /// The version of a category that has not negotiated yet.
    pub const UNNEGOTIATED: Self = Self::new(0, 0);

    /// Creates a version from its parts.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns `true` unless this is [`UNNEGOTIATED`](Self::UNNEGOTIATED).
    pub fn is_negotiated(&self) -> bool {
        *self != Self::UNNEGOTIATED
    }
}

impl Default for VersionType {
    fn default() -> Self {
        Self::UNNEGOTIATED
    }
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
