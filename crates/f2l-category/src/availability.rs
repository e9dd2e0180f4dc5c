//! Per-operation minimum versions.
//!
//! A category that supports 1.0 and 1.1 is one implementation; the few
//! operations added in 1.1 are listed here with the version that
//! introduced them. Anything not listed works in every supported version.

use std::collections::HashMap;

use f2l_protocol::{CategoryId, VersionType};

use crate::CategoryError;

/// Maps an operation name to the version that introduced it.
#[derive(Debug, Clone, Default)]
pub struct MethodAvailabilityTable {
    entries: HashMap<&'static str, VersionType>,
}

impl MethodAvailabilityTable {
    /// An empty table: every operation available in every version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style.
    pub fn with(mut self, method: &'static str, since: VersionType) -> Self {
        self.entries.insert(method, since);
        self
    }

    /// Returns the version that introduced `method`, if it is gated.
    pub fn minimum_version(&self, method: &str) -> Option<VersionType> {
        self.entries.get(method).copied()
    }

    /// Returns `true` if `method` may be used at `effective`.
    pub fn is_supported(&self, method: &str, effective: VersionType) -> bool {
        match self.entries.get(method) {
            Some(since) => effective >= *since,
            None => true,
        }
    }

    /// Number of gated operations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is gated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that every entry is newer than `oldest`.
    ///
    /// An entry at or below the oldest supported version gates nothing
    /// and means the table was written against the wrong version list.
    pub(crate) fn validate(
        &self,
        category: CategoryId,
        oldest: VersionType,
    ) -> Result<(), CategoryError> {
        for (method, since) in &self.entries {
            if *since <= oldest {
                return Err(CategoryError::InvalidOperation(format!(
                    "{category}: method {method} gated at {since} but \
                     the oldest supported version is {oldest}"
                )));
            }
        }
        Ok(())
    }
}
