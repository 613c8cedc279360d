//! Process-local counters folded by [`super::sink::GlobalMetricsSink`].
//!
//! Deliberately thread-local rather than a language-level global, matching
//! the transaction-scoped-state design note in spec.md §9 ("Global state"):
//! the counters here are diagnostic aggregate, not part of any transaction's
//! correctness-relevant state, so a simple `Cell`/`RefCell` pair is enough.

use std::cell::RefCell;

#[derive(Clone, Copy, Debug, Default)]
pub struct Counters {
    pub adjacency_puts: u64,
    pub adjacency_mirror_puts: u64,
    pub adjacency_commits: u64,
    pub iterator_seeks: u64,
    pub iterator_merge_fanin_max: u64,
    pub traversal_steps_advanced: u64,
    pub traversal_backtracks: u64,
    pub traversal_scope_clears: u64,
    pub traversal_seek_skips: u64,
}

thread_local! {
    static STATE: RefCell<Counters> = RefCell::new(Counters::default());
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut Counters) -> R) -> R {
    STATE.with(|cell| f(&mut cell.borrow_mut()))
}

/// Snapshot the current counters.
#[must_use]
pub fn report() -> Counters {
    STATE.with(|cell| *cell.borrow())
}

/// Reset all counters to zero.
pub fn reset() {
    STATE.with(|cell| *cell.borrow_mut() = Counters::default());
}
