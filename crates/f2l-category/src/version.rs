//! Per-category version state and the negotiation state machine.
//!
//! ```text
//! Unnegotiated (0.0) ──set_version(v ∈ supported)──→ Negotiated(v)
//!        │                                                │
//!        └── set_version(v ∉ supported) → error,          └── no way back
//!            state unchanged
//! ```
//!
//! Fixed-version categories skip the machine and always report the same
//! version.

use std::sync::OnceLock;

use f2l_protocol::{CategoryId, VersionType};

use crate::CategoryError;

#[derive(Debug)]
enum Policy {
    Fixed(VersionType),
    Negotiable {
        /// Sorted ascending, no duplicates.
        supported: Vec<VersionType>,
        /// Written once; `OnceLock` publishes the write to every reader.
        effective: OnceLock<VersionType>,
    },
}

/// The version a category stamps on its traffic and gates methods with.
#[derive(Debug)]
pub struct VersionState {
    policy: Policy,
}

impl VersionState {
    /// A category that never negotiates.
    pub fn fixed(version: VersionType) -> Self {
        Self {
            policy: Policy::Fixed(version),
        }
    }

    /// A category that negotiates one of `supported` per session.
    ///
    /// # Errors
    /// [`CategoryError::InvalidOperation`] if the set is empty or contains
    /// the unnegotiated version.
    pub fn negotiable(
        supported: impl IntoIterator<Item = VersionType>,
    ) -> Result<Self, CategoryError> {
        let mut supported: Vec<VersionType> = supported.into_iter().collect();
        supported.sort_unstable();
        supported.dedup();

        if supported.is_empty() {
            return Err(CategoryError::InvalidOperation(
                "a negotiable category needs at least one supported version".into(),
            ));
        }
        if supported.contains(&VersionType::UNNEGOTIATED) {
            return Err(CategoryError::InvalidOperation(
                "0.0 cannot be a supported version".into(),
            ));
        }

        Ok(Self {
            policy: Policy::Negotiable {
                supported,
                effective: OnceLock::new(),
            },
        })
    }

    /// The effective version: the fixed one, the negotiated one, or 0.0.
    pub fn current(&self) -> VersionType {
        match &self.policy {
            Policy::Fixed(v) => *v,
            Policy::Negotiable { effective, .. } => {
                effective.get().copied().unwrap_or(VersionType::UNNEGOTIATED)
            }
        }
    }

    /// Every version this category can run at, ascending.
    pub fn supported(&self) -> &[VersionType] {
        match &self.policy {
            Policy::Fixed(v) => std::slice::from_ref(v),
            Policy::Negotiable { supported, .. } => supported,
        }
    }

    /// The oldest supported version.
    pub fn oldest(&self) -> VersionType {
        // Both policies guarantee at least one entry.
        self.supported()[0]
    }

    /// Returns `true` unless the version is fixed.
    pub fn is_negotiable(&self) -> bool {
        matches!(self.policy, Policy::Negotiable { .. })
    }

    /// Returns `true` once a version is in effect.
    pub fn is_negotiated(&self) -> bool {
        self.current().is_negotiated()
    }

    /// Moves to `Negotiated(requested)`.
    ///
    /// Asking again for the version already in effect is accepted;
    /// asking for a different one after negotiation is refused.
    ///
    /// # Errors
    /// - [`CategoryError::UnsupportedVersion`]: `requested` is not supported;
    ///   the effective version is unchanged.
    /// - [`CategoryError::InvalidOperation`]: a different version is already
    ///   in effect.
    pub fn negotiate(
        &self,
        category: CategoryId,
        requested: VersionType,
    ) -> Result<(), CategoryError> {
        match &self.policy {
            Policy::Fixed(fixed) => {
                if *fixed == requested {
                    Ok(())
                } else {
                    Err(CategoryError::UnsupportedVersion {
                        category,
                        version: requested,
                    })
                }
            }
            Policy::Negotiable {
                supported,
                effective,
            } => {
                if !supported.contains(&requested) {
                    tracing::debug!(%category, %requested, "rejected unsupported version");
                    return Err(CategoryError::UnsupportedVersion {
                        category,
                        version: requested,
                    });
                }

                // `set` fails if someone got there first; then the only
                // acceptable outcome is that they picked the same version.
                if effective.set(requested).is_ok() {
                    tracing::info!(%category, version = %requested, "version negotiated");
                    return Ok(());
                }
                match effective.get() {
                    Some(current) if *current == requested => Ok(()),
                    Some(current) => Err(CategoryError::InvalidOperation(format!(
                        "{category} already negotiated {current}, cannot switch to {requested}"
                    ))),
                    None => Err(CategoryError::InvalidOperation(format!(
                        "{category} failed to record version {requested}"
                    ))),
                }
            }
        }
    }
}

/// Capability of a category whose version is negotiated per session.
///
/// Object safe so that a connection-negotiation category can hold a list
/// of collaborators without knowing their concrete types.
pub trait VersionNegotiable: Send + Sync {
    /// The category's identity.
    fn category_id(&self) -> CategoryId;

    /// The category's version state.
    fn version_state(&self) -> &VersionState;

    /// Every version the category can run at, ascending.
    fn supported_versions(&self) -> &[VersionType] {
        self.version_state().supported()
    }

    /// The effective version, 0.0 until negotiated.
    fn version(&self) -> VersionType {
        self.version_state().current()
    }

    /// Negotiates `major.minor` for the rest of the session.
    fn set_version(&self, major: u32, minor: u32) -> Result<(), CategoryError> {
        self.version_state()
            .negotiate(self.category_id(), VersionType::new(major, minor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1_0: VersionType = VersionType::new(1, 0);
    const V1_1: VersionType = VersionType::new(1, 1);

    fn state() -> VersionState {
        VersionState::negotiable([V1_1, V1_0]).unwrap()
    }

    #[test]
    fn test_negotiable_starts_unnegotiated() {
        let state = state();
        assert_eq!(state.current(), VersionType::UNNEGOTIATED);
        assert!(!state.is_negotiated());
        assert!(state.is_negotiable());
    }

    #[test]
    fn test_negotiable_sorts_supported_versions() {
        assert_eq!(state().supported(), &[V1_0, V1_1]);
        assert_eq!(state().oldest(), V1_0);
    }

    #[test]
    fn test_negotiate_supported_version_succeeds() {
        let state = state();
        state.negotiate(CategoryId::AutoPlay, V1_1).unwrap();
        assert_eq!(state.current(), V1_1);
    }

    #[test]
    fn test_negotiate_unsupported_version_leaves_state_unchanged() {
        let state = state();
        let result = state.negotiate(CategoryId::AutoPlay, VersionType::new(2, 0));
        assert!(matches!(
            result,
            Err(CategoryError::UnsupportedVersion { category: CategoryId::AutoPlay, version })
                if version == VersionType::new(2, 0)
        ));
        assert_eq!(state.current(), VersionType::UNNEGOTIATED);

        // Also after a successful negotiation.
        state.negotiate(CategoryId::AutoPlay, V1_0).unwrap();
        let _ = state.negotiate(CategoryId::AutoPlay, VersionType::new(9, 9));
        assert_eq!(state.current(), V1_0);
    }

    #[test]
    fn test_negotiate_same_version_twice_is_accepted() {
        let state = state();
        state.negotiate(CategoryId::AutoPlay, V1_0).unwrap();
        state.negotiate(CategoryId::AutoPlay, V1_0).unwrap();
        assert_eq!(state.current(), V1_0);
    }

    #[test]
    fn test_negotiate_different_version_after_negotiation_is_refused() {
        let state = state();
        state.negotiate(CategoryId::AutoPlay, V1_0).unwrap();
        let result = state.negotiate(CategoryId::AutoPlay, V1_1);
        assert!(matches!(result, Err(CategoryError::InvalidOperation(_))));
        assert_eq!(state.current(), V1_0);
    }

    #[test]
    fn test_fixed_reports_hardcoded_version() {
        let state = VersionState::fixed(V1_0);
        assert_eq!(state.current(), V1_0);
        assert!(!state.is_negotiable());
        assert_eq!(state.supported(), &[V1_0]);
        assert!(state.negotiate(CategoryId::WapSign, V1_0).is_ok());
        assert!(state.negotiate(CategoryId::WapSign, V1_1).is_err());
    }

    #[test]
    fn test_negotiable_rejects_empty_and_zero_sets() {
        assert!(VersionState::negotiable([]).is_err());
        assert!(VersionState::negotiable([VersionType::UNNEGOTIATED, V1_0]).is_err());
    }
}
