//! Transaction lifecycle (spec.md §6: `Transaction.open(mode)`, `commit()`,
//! `close()`).
//!
//! Grounded in the teacher's `db/registry.rs` `StoreHandle`/`StoreRegistry`
//! ownership shape: a `Transaction` owns exactly one [`Graph`] handle and the
//! [`KeyGenerator`] scoped to it, never a thread-local or process-wide one
//! (spec.md §9 "Global state"). Commit and close are one-way: a transaction
//! that fails to commit because of a `StorageFailure` is poisoned and every
//! further call returns `InvalidState` (spec.md §7 "transaction is poisoned
//! and must be aborted").

pub mod diagnostics;

use crate::{
    error::{ErrorClass, ErrorOrigin, GraphError, GraphResult},
    graph::Graph,
    iid::KeyGenerator,
    storage::Storage,
};
use diagnostics::DiagnosticsSnapshot;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionMode {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TransactionState {
    Open,
    Committed,
    Closed,
    Poisoned,
}

/// An interactive transaction over one [`Storage`] handle (spec.md §6).
pub struct Transaction<S: Storage> {
    graph: Graph<S>,
    mode: TransactionMode,
    state: TransactionState,
}

impl<S: Storage> Transaction<S> {
    /// Open a transaction over `storage` with a fresh, transaction-scoped
    /// [`KeyGenerator`] (spec.md §3 "Ownership": "the only global state is
    /// the storage handle and the per-prefix key generator; both are scoped
    /// to the transaction").
    #[must_use]
    pub fn open(storage: S, mode: TransactionMode) -> Self {
        let graph = Graph::new(storage, KeyGenerator::new());
        if mode == TransactionMode::Read {
            graph.set_read_only();
        }
        Self {
            graph,
            mode,
            state: TransactionState::Open,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> TransactionMode {
        self.mode
    }

    /// The typed graph facade this transaction mutates and queries through.
    #[must_use]
    pub fn graph(&self) -> &Graph<S> {
        &self.graph
    }

    fn ensure_open(&self) -> GraphResult<()> {
        match self.state {
            TransactionState::Open => Ok(()),
            TransactionState::Poisoned => Err(GraphError::invalid_state(
                ErrorOrigin::Transaction,
                "transaction is poisoned by a prior storage failure and must be aborted",
            )),
            TransactionState::Committed | TransactionState::Closed => Err(GraphError::invalid_state(
                ErrorOrigin::Transaction,
                "transaction is no longer open",
            )),
        }
    }

    /// Flush every buffered vertex and edge into storage (spec.md §4.3
    /// `commit`, §4.4 `commit`). A write-mode-only operation; a
    /// `StorageFailure` here poisons the transaction rather than leaving it
    /// open in an unknown state.
    pub fn commit(&mut self) -> GraphResult<()> {
        self.ensure_open()?;
        if self.mode == TransactionMode::Read {
            return Err(GraphError::invalid_state(
                ErrorOrigin::Transaction,
                "a read-only transaction cannot commit",
            ));
        }
        match self.graph.commit() {
            Ok(()) => {
                self.state = TransactionState::Committed;
                Ok(())
            }
            Err(err) => {
                if err.class == ErrorClass::StorageFailure {
                    self.state = TransactionState::Poisoned;
                }
                Err(err)
            }
        }
    }

    /// Release the transaction without committing. Idempotent.
    pub fn close(&mut self) {
        if self.state == TransactionState::Open {
            self.state = TransactionState::Closed;
        }
    }

    /// Read-only snapshot of buffered state, for embedders debugging a
    /// stuck traversal and for this crate's own test suite.
    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot::capture(&self.graph)
    }

    /// Reclaim the underlying storage handle to open the next transaction
    /// in the same session over the same data (spec.md §5: one storage
    /// handle, sequential transactions). Closes this transaction first.
    ///
    /// Panics if a clone of this transaction's [`Graph`] handle is still
    /// alive — this crate never produces one itself, so that can only
    /// happen if calling code cloned `self.graph()` and held onto it past
    /// the transaction's lifetime, which is itself a misuse this method is
    /// entitled to reject loudly rather than hand back storage two owners
    /// still think they can mutate.
    #[must_use]
    pub fn into_storage(mut self) -> S {
        self.close();
        let graph = self.graph.clone();
        drop(self);
        graph.into_storage()
    }
}

impl<S: Storage> Drop for Transaction<S> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn read_only_transaction_rejects_commit() {
        let mut txn = Transaction::open(MemoryStorage::new(), TransactionMode::Read);
        let err = txn.commit().expect_err("read-only commit should fail");
        assert_eq!(err.class, ErrorClass::InvalidState);
    }

    #[test]
    fn committed_transaction_rejects_a_second_commit() {
        let mut txn = Transaction::open(MemoryStorage::new(), TransactionMode::Write);
        txn.commit().expect("first commit should succeed");
        let err = txn.commit().expect_err("second commit should fail");
        assert_eq!(err.class, ErrorClass::InvalidState);
    }

    #[test]
    fn read_only_transaction_rejects_a_mutating_call() {
        let txn = Transaction::open(MemoryStorage::new(), TransactionMode::Read);
        let err = txn
            .graph()
            .create_type(crate::iid::VertexKind::EntityType, "person", None)
            .expect_err("a read-only transaction's graph must reject create_type");
        assert_eq!(err.class, ErrorClass::InvalidState);
    }
}
