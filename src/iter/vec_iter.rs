//! Leaf iterator over an already-sorted `Vec<T>`.
//!
//! Every concrete source in this crate — a storage façade scan, a buffered
//! edge bucket — is adapted into the algebra by first materializing into
//! (or already holding) an ascending `Vec<T>` and wrapping it here. This is
//! the base case the combinators in this module build on.

use super::{IterState, SortedIterator, assert_monotonic, check_seek_not_backward};
use crate::error::GraphError;
use std::collections::VecDeque;

pub struct VecSortedIterator<T: Ord + Clone + std::fmt::Debug> {
    remaining: VecDeque<T>,
    fetched: Option<T>,
    last_emitted: Option<T>,
    state: IterState,
}

impl<T: Ord + Clone + std::fmt::Debug> VecSortedIterator<T> {
    /// `items` must already be sorted ascending; this is a precondition, not
    /// something this type checks (debug builds catch it via
    /// `assert_monotonic` on the first few `next()` calls).
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            remaining: items.into(),
            fetched: None,
            last_emitted: None,
            state: IterState::Empty,
        }
    }

    fn ensure_fetched(&mut self) {
        if matches!(self.state, IterState::Empty) {
            self.fetched = self.remaining.pop_front();
            self.state = match self.fetched {
                Some(_) => IterState::Fetched,
                None => IterState::Completed,
            };
        }
    }
}

impl<T: Ord + Clone + std::fmt::Debug> SortedIterator for VecSortedIterator<T> {
    type Item = T;

    fn peek(&mut self) -> Option<&Self::Item> {
        self.ensure_fetched();
        self.fetched.as_ref()
    }

    fn next(&mut self) -> Option<Self::Item> {
        self.ensure_fetched();
        let item = self.fetched.take()?;
        assert_monotonic(self.last_emitted.as_ref(), &item);
        self.last_emitted = Some(item.clone());
        self.state = IterState::Empty;
        Some(item)
    }

    fn seek(&mut self, target: &Self::Item) -> Result<(), GraphError> {
        check_seek_not_backward(self.last_emitted.as_ref(), target)?;

        // If a value is already fetched and the target <= fetched, seek is
        // a no-op (spec.md §4.2, map-sorted semantics generalised to every
        // wrapper that holds a one-element lookahead buffer).
        if let Some(fetched) = &self.fetched
            && target <= fetched
        {
            return Ok(());
        }

        self.fetched = None;
        self.state = IterState::Empty;
        while let Some(front) = self.remaining.front() {
            if front >= target {
                break;
            }
            self.remaining.pop_front();
        }
        Ok(())
    }

    fn recycle(&mut self) {
        self.remaining.clear();
        self.fetched = None;
        self.state = IterState::Completed;
    }
}
