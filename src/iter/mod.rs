//! Sorted, forwardable iterator algebra (spec.md §4.2).
//!
//! The connective tissue between storage scans and the adjacency/traversal
//! layers. Every iterator here is typed by an element `T: Ord` (spec's
//! "Comparable") and an ascending order — we only ever use ascending, so
//! there is no separate `Order` parameter to thread through every
//! combinator; the element's own `Ord` impl (e.g. [`crate::iid::VertexIID`]'s
//! lexicographic byte order) *is* the order.
//!
//! Grounded in the teacher crate's wrapper-iterator style (`db/cursor`
//! layers validation wrappers around a base iterator the same way this
//! module layers `map_sorted`/`merge`/`intersect`/`distinct`/`filter`
//! around a base storage scan), and in the teacher's hand-written `Ord` impl
//! on `Key` (`key/mod.rs`) that this crate's byte-ordered IIDs reuse as a
//! model for "ordering is whatever `Ord` says, not derived field order".

mod distinct;
mod filter;
mod limit;
mod map_sorted;
mod merge;
mod intersect;
mod vec_iter;
mod wrappers;

#[cfg(test)]
mod tests;

pub use distinct::Distinct;
pub use filter::Filter;
pub use limit::Limit;
pub use map_sorted::MapSorted;
pub use merge::Merge;
pub use intersect::Intersect;
pub use vec_iter::VecSortedIterator;
pub use wrappers::{OnConsumed, OnFinalise};

use crate::error::{ErrorOrigin, GraphError};

/// Three-state state machine described in spec.md §4.2: `Empty` (not yet
/// fetched), `Fetched` (one element peeked), `Completed`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum IterState {
    Empty,
    Fetched,
    Completed,
}

/// A lazy, sorted, forwardable stream of `T`.
///
/// `seek(target)` positions the stream at the smallest element `>= target`
/// without rewinding. Implementations must never emit a decreasing pair from
/// successive `next()` calls — violating that is an internal-error-level
/// programmer mistake (spec.md §4.2 "Failure semantics"), asserted via
/// [`assert_monotonic`] rather than returned as a `Result`. Seeking backward
/// past the last emitted element, by contrast, is a caller mistake and *is*
/// surfaced as a `GraphError` (`ErrorClass::InvalidArgument`).
pub trait SortedIterator {
    type Item: Ord + Clone + std::fmt::Debug;

    /// Peek without consuming. Requires a prior successful fetch; panics if
    /// called while the stream is `Empty` and has not yet been primed by a
    /// `peek`/`next`/`seek` call (mirrors spec's "`peek` requires
    /// `hasNext`").
    fn peek(&mut self) -> Option<&Self::Item>;

    /// Advance and return the next element, if any.
    fn next(&mut self) -> Option<Self::Item>;

    /// Forward-seek to the smallest element `>= target`.
    fn seek(&mut self, target: &Self::Item) -> Result<(), GraphError>;

    /// Release any held storage scans. Idempotent.
    fn recycle(&mut self);
}

/// Assert that `next` does not violate the stream's monotonic non-decreasing
/// contract relative to `last`. An internal-error-level assertion per
/// spec.md §4.2, not a recoverable condition.
pub(crate) fn assert_monotonic<T: Ord + std::fmt::Debug>(last: Option<&T>, next: &T) {
    if let Some(last) = last {
        assert!(
            next >= last,
            "sorted iterator invariant violated: emitted {next:?} after {last:?}"
        );
    }
}

/// Reject a seek target that is behind the last emitted element.
pub(crate) fn check_seek_not_backward<T: Ord + std::fmt::Debug>(
    last: Option<&T>,
    target: &T,
) -> Result<(), GraphError> {
    if let Some(last) = last
        && target < last
    {
        return Err(GraphError::seek_backward(
            ErrorOrigin::Iterator,
            format!("seek target {target:?} is behind last emitted element {last:?}"),
        ));
    }
    Ok(())
}
