//! Transaction scopes.
//!
//! The Foundation opens a transaction around a stretch of game-cycle work
//! and expects every transactional request sent inside it to carry the
//! same token. A session keeps every open [`TransactionScope`] on a
//! stack; the token in force is the one of the most recently opened scope
//! still alive. Scopes may close in any order: a scope only ever removes
//! its own entry.

use std::sync::{Mutex, MutexGuard};

use f2l_protocol::TransactionToken;
use rand::Rng;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Generates a fresh transaction token: 16 random bytes as 32 hex chars.
pub(crate) fn generate_token() -> TransactionToken {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    TransactionToken::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}

/// Open scopes, oldest first.
#[derive(Debug, Default)]
pub(crate) struct ActiveTransactions {
    next_id: u64,
    open: Vec<(u64, TransactionToken)>,
}

impl ActiveTransactions {
    /// The token of the newest open scope, or the empty sentinel.
    pub(crate) fn current(&self) -> TransactionToken {
        self.open
            .last()
            .map_or_else(TransactionToken::none, |(_, token)| token.clone())
    }

    fn push(&mut self, token: TransactionToken) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.open.push((id, token));
        id
    }

    fn remove(&mut self, id: u64) {
        self.open.retain(|(open_id, _)| *open_id != id);
    }
}

/// Guard returned by [`Session::begin_transaction`](crate::Session::begin_transaction)
/// and [`Session::enter_transaction`](crate::Session::enter_transaction).
///
/// Dropping the scope ends its transaction. Scopes opened later and still
/// alive keep theirs.
#[must_use = "the transaction ends as soon as the scope is dropped"]
pub struct TransactionScope<'a> {
    active: &'a Mutex<ActiveTransactions>,
    id: u64,
    token: TransactionToken,
}

impl<'a> TransactionScope<'a> {
    pub(crate) fn open(active: &'a Mutex<ActiveTransactions>, token: TransactionToken) -> Self {
        let id = lock(active).push(token.clone());
        tracing::trace!(%token, scope = id, "transaction scope opened");
        Self { active, id, token }
    }

    /// The token of this scope.
    pub fn token(&self) -> &TransactionToken {
        &self.token
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        let mut active = lock(self.active);
        active.remove(self.id);
        tracing::trace!(
            token = %self.token,
            scope = self.id,
            current = %active.current(),
            "transaction scope closed"
        );
    }
}
