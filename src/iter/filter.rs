//! `filter`: straightforward predicate wrapper (spec.md §4.2).

use super::{IterState, SortedIterator, assert_monotonic, check_seek_not_backward};
use crate::error::GraphError;

pub struct Filter<I: SortedIterator, F: FnMut(&I::Item) -> bool> {
    source: I,
    predicate: F,
    fetched: Option<I::Item>,
    last_emitted: Option<I::Item>,
    state: IterState,
}

impl<I: SortedIterator, F: FnMut(&I::Item) -> bool> Filter<I, F> {
    pub fn new(source: I, predicate: F) -> Self {
        Self {
            source,
            predicate,
            fetched: None,
            last_emitted: None,
            state: IterState::Empty,
        }
    }

    fn ensure_fetched(&mut self) {
        if !matches!(self.state, IterState::Empty) {
            return;
        }
        loop {
            match self.source.peek() {
                None => {
                    self.state = IterState::Completed;
                    return;
                }
                Some(value) => {
                    if !(self.predicate)(value) {
                        self.source.next();
                        continue;
                    }
                    self.fetched = Some(value.clone());
                    self.state = IterState::Fetched;
                    return;
                }
            }
        }
    }
}

impl<I: SortedIterator, F: FnMut(&I::Item) -> bool> SortedIterator for Filter<I, F> {
    type Item = I::Item;

    fn peek(&mut self) -> Option<&Self::Item> {
        self.ensure_fetched();
        self.fetched.as_ref()
    }

    fn next(&mut self) -> Option<Self::Item> {
        self.ensure_fetched();
        let item = self.fetched.take()?;
        self.source.next();
        assert_monotonic(self.last_emitted.as_ref(), &item);
        self.last_emitted = Some(item.clone());
        self.state = IterState::Empty;
        Some(item)
    }

    fn seek(&mut self, target: &Self::Item) -> Result<(), GraphError> {
        check_seek_not_backward(self.last_emitted.as_ref(), target)?;

        if let Some(fetched) = &self.fetched
            && target <= fetched
        {
            return Ok(());
        }

        self.fetched = None;
        self.state = IterState::Empty;
        self.source.seek(target)
    }

    fn recycle(&mut self) {
        self.source.recycle();
        self.fetched = None;
        self.state = IterState::Completed;
    }
}
