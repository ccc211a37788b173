//! Transaction coordinator: one atomic scope per store handle.
//!
//! # Responsibility
//! - Wrap a unit of work in begin/commit, rolling back on any failure.
//! - Reject a second scope on a handle that already has one open.
//!
//! # Invariants
//! - A scope moves `Open -> Committed | RolledBack` exactly once.
//! - A failure returned from `run_in_transaction` has already been rolled
//!   back; partial commits never leak.
//! - A scope dropped while open (unwinding body) rolls back.

use crate::engine::normalize;
use crate::error::{DataError, DataResult};
use crate::store::{SlotClaim, StoreHandle};
use log::{debug, error, warn};
use uuid::Uuid;

/// Lifecycle of one transaction scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Open,
    Committed,
    RolledBack,
}

/// Handle given to a transaction body.
///
/// Run repository calls against [`TransactionScope::store`]; the coordinator
/// owns commit and rollback.
pub struct TransactionScope<'s, S: StoreHandle + ?Sized> {
    store: &'s S,
    id: Uuid,
    state: ScopeState,
    _claim: SlotClaim<'s>,
}

impl<'s, S: StoreHandle + ?Sized> TransactionScope<'s, S> {
    fn begin(store: &'s S, claim: SlotClaim<'s>) -> DataResult<Self> {
        let id = Uuid::new_v4();
        if let Err(err) = store.begin_transaction() {
            let normalized = normalize(&err);
            warn!(
                "event=tx_begin module=tx status=error scope_id={id} error_code={} error={err}",
                normalized.code()
            );
            return Err(normalized);
        }
        debug!("event=tx_begin module=tx status=ok scope_id={id}");
        Ok(Self {
            store,
            id,
            state: ScopeState::Open,
            _claim: claim,
        })
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    fn commit(mut self) -> DataResult<()> {
        match self.store.commit() {
            Ok(()) => {
                self.state = ScopeState::Committed;
                debug!("event=tx_commit module=tx status=ok scope_id={}", self.id);
                Ok(())
            }
            Err(err) => {
                let normalized = normalize(&err);
                warn!(
                    "event=tx_commit module=tx status=error scope_id={} error_code={} error={err}",
                    self.id,
                    normalized.code()
                );
                self.rollback();
                Err(normalized)
            }
        }
    }

    /// Rolls back; a rollback failure is logged, never returned, so the
    /// caller still sees the error that triggered it.
    fn rollback(&mut self) {
        if self.state != ScopeState::Open {
            return;
        }
        self.state = ScopeState::RolledBack;
        match self.store.rollback() {
            Ok(()) => debug!("event=tx_rollback module=tx status=ok scope_id={}", self.id),
            Err(err) => error!(
                "event=tx_rollback module=tx status=error scope_id={} error={err}",
                self.id
            ),
        }
    }
}

impl<S: StoreHandle + ?Sized> Drop for TransactionScope<'_, S> {
    fn drop(&mut self) {
        self.rollback();
    }
}

/// Scopes work on one store handle.
pub struct TransactionCoordinator<'s, S: StoreHandle + ?Sized> {
    store: &'s S,
}

impl<'s, S: StoreHandle + ?Sized> TransactionCoordinator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Whether any scope is currently open on the handle.
    pub fn is_active(&self) -> bool {
        self.store.scope_slot().is_active()
    }

    /// Runs `body` inside one transaction.
    ///
    /// Commits when `body` returns `Ok`; rolls back and returns the body's
    /// error unchanged otherwise. Fails with `NestedTransaction` when the
    /// handle already has an open scope, from this or any other thread.
    pub fn run_in_transaction<T, F>(&self, body: F) -> DataResult<T>
    where
        F: FnOnce(&TransactionScope<'s, S>) -> DataResult<T>,
    {
        let claim = self.store.scope_slot().claim().ok_or_else(|| {
            warn!("event=tx_begin module=tx status=error error_code=nested_transaction");
            DataError::NestedTransaction
        })?;
        let mut scope = TransactionScope::begin(self.store, claim)?;

        match body(&scope) {
            Ok(value) => {
                scope.commit()?;
                Ok(value)
            }
            Err(err) => {
                debug!(
                    "event=tx_body module=tx status=error scope_id={} error_code={}",
                    scope.id(),
                    err.code()
                );
                scope.rollback();
                Err(err)
            }
        }
    }
}

/// Shorthand for `TransactionCoordinator::new(store).run_in_transaction(body)`.
pub fn run_in_transaction<'s, S, T, F>(store: &'s S, body: F) -> DataResult<T>
where
    S: StoreHandle + ?Sized,
    F: FnOnce(&TransactionScope<'s, S>) -> DataResult<T>,
{
    TransactionCoordinator::new(store).run_in_transaction(body)
}
