//! Store handle seam consumed by the execution engine.
//!
//! # Responsibility
//! - Describe the minimal surface the core needs from a relational store.
//! - Let adapters classify their own failures into engine-neutral classes.
//!
//! # Invariants
//! - The core never opens or closes a handle; callers own its lifecycle.
//! - At most one transaction scope is claimed per handle at a time.
//! - While a scope is open, only its owning thread may write through the
//!   handle.

use crate::error::ConstraintKind;
use crate::model::record::Record;
use crate::model::value::Value;
use std::error::Error;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

mod sqlite;

pub use sqlite::{SqliteStore, SqliteStoreError};

/// Outcome of one write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executed {
    pub rows_affected: usize,
    /// Row id generated by the statement, when the store reports one.
    pub last_insert_id: Option<i64>,
}

/// Engine-neutral classification of a store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureClass {
    Constraint {
        kind: ConstraintKind,
        column: Option<String>,
    },
    Unavailable,
    Malformed,
}

/// Store-specific error that knows its own failure class.
pub trait StoreFailure: Error + 'static {
    fn classify(&self) -> FailureClass;
}

/// Opened relational store supporting positional parameters and
/// transactions.
pub trait StoreHandle {
    type Error: StoreFailure;

    fn execute(&self, sql: &str, params: &[Value]) -> Result<Executed, Self::Error>;
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>, Self::Error>;
    fn begin_transaction(&self) -> Result<(), Self::Error>;
    fn commit(&self) -> Result<(), Self::Error>;
    fn rollback(&self) -> Result<(), Self::Error>;
    /// Single-scope slot guarding transactions on this handle.
    fn scope_slot(&self) -> &ScopeSlot;
}

/// Marks the thread that owns the active transaction scope, if any.
#[derive(Debug, Default)]
pub struct ScopeSlot {
    owner: Mutex<Option<ThreadId>>,
}

impl ScopeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.owner().is_some()
    }

    /// Whether the calling thread may write: no scope is open, or it owns it.
    pub fn admits_current_thread(&self) -> bool {
        self.owner()
            .map_or(true, |owner| owner == thread::current().id())
    }

    /// Claims the slot for the calling thread; `None` when a scope is open.
    pub(crate) fn claim(&self) -> Option<SlotClaim<'_>> {
        let mut owner = self.lock();
        if owner.is_some() {
            return None;
        }
        *owner = Some(thread::current().id());
        Some(SlotClaim { slot: self })
    }

    fn owner(&self) -> Option<ThreadId> {
        *self.lock()
    }

    // A poisoned lock still holds a whole id.
    fn lock(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the slot on drop.
#[derive(Debug)]
pub(crate) struct SlotClaim<'a> {
    slot: &'a ScopeSlot,
}

impl Drop for SlotClaim<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::ScopeSlot;

    #[test]
    fn slot_admits_one_claim_until_released() {
        let slot = ScopeSlot::new();
        let first = slot.claim().expect("first claim should succeed");
        assert!(slot.is_active());
        assert!(slot.claim().is_none());
        drop(first);
        assert!(!slot.is_active());
        assert!(slot.claim().is_some());
    }

    #[test]
    fn open_slot_admits_only_its_owner_thread() {
        let slot = ScopeSlot::new();
        assert!(slot.admits_current_thread());

        let _claim = slot.claim().expect("claim should succeed");
        assert!(slot.admits_current_thread());
        std::thread::scope(|s| {
            let admitted = s.spawn(|| slot.admits_current_thread()).join().unwrap();
            assert!(!admitted);
        });
    }
}
