//! `intersect`: lockstep walk over N streams.
//!
//! Take the max of the current peeks and seek every other stream to it;
//! repeat until all N agree or one is exhausted (spec.md §4.2). Every
//! `seek` issued here is forward-only by construction: the running maximum
//! can never fall behind any child's own last-emitted element.

use super::{IterState, SortedIterator, assert_monotonic, check_seek_not_backward};
use crate::error::GraphError;

pub struct Intersect<T: Ord + Clone + std::fmt::Debug> {
    children: Vec<Box<dyn SortedIterator<Item = T>>>,
    fetched: Option<T>,
    last_emitted: Option<T>,
    state: IterState,
}

impl<T: Ord + Clone + std::fmt::Debug> Intersect<T> {
    #[must_use]
    pub fn new(children: Vec<Box<dyn SortedIterator<Item = T>>>) -> Self {
        Self {
            children,
            fetched: None,
            last_emitted: None,
            state: IterState::Empty,
        }
    }

    fn ensure_fetched(&mut self) {
        if !matches!(self.state, IterState::Empty) {
            return;
        }
        if self.children.is_empty() {
            self.state = IterState::Completed;
            return;
        }

        loop {
            let mut peeks: Vec<T> = Vec::with_capacity(self.children.len());
            for child in &mut self.children {
                match child.peek() {
                    Some(value) => peeks.push(value.clone()),
                    None => {
                        self.state = IterState::Completed;
                        return;
                    }
                }
            }

            let max = peeks.iter().max().cloned().expect("checked non-empty above");
            if peeks.iter().all(|value| *value == max) {
                self.fetched = Some(max);
                self.state = IterState::Fetched;
                return;
            }

            for child in &mut self.children {
                child
                    .seek(&max)
                    .expect("intersect seek is always forward relative to each child");
            }
        }
    }
}

impl<T: Ord + Clone + std::fmt::Debug> SortedIterator for Intersect<T> {
    type Item = T;

    fn peek(&mut self) -> Option<&Self::Item> {
        self.ensure_fetched();
        self.fetched.as_ref()
    }

    fn next(&mut self) -> Option<Self::Item> {
        self.ensure_fetched();
        let item = self.fetched.take()?;
        for child in &mut self.children {
            child.next();
        }
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
        for child in &mut self.children {
            child.seek(target)?;
        }
        Ok(())
    }

    fn recycle(&mut self) {
        for child in &mut self.children {
            child.recycle();
        }
        self.fetched = None;
        self.state = IterState::Completed;
    }
}
