//! `merge`: N-way ordered union of forwardable streams.
//!
//! A min-heap over the peeked element of each active stream (spec.md §4.2).
//! This is the operator that turns "buffered edges" and "persisted edges"
//! into a single ordered view in [`crate::graph::adjacency`] — paired with
//! [`super::Distinct`] so a logical edge present in both buffer and storage
//! is only emitted once (spec.md §9 "Overlay union").

use super::{IterState, SortedIterator, assert_monotonic, check_seek_not_backward};
use crate::{
    error::GraphError,
    obs::sink::{self, MetricsEvent},
};
use std::{cmp::Reverse, collections::BinaryHeap};

struct HeapEntry<T: Ord>(T, usize);

impl<T: Ord> PartialEq for HeapEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}
impl<T: Ord> Eq for HeapEntry<T> {}
impl<T: Ord> PartialOrd for HeapEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: Ord> Ord for HeapEntry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0).then(self.1.cmp(&other.1))
    }
}

pub struct Merge<T: Ord + Clone + std::fmt::Debug> {
    children: Vec<Box<dyn SortedIterator<Item = T>>>,
    heap: BinaryHeap<Reverse<HeapEntry<T>>>,
    initialized: bool,
    fetched: Option<T>,
    last_emitted: Option<T>,
    state: IterState,
}

impl<T: Ord + Clone + std::fmt::Debug> Merge<T> {
    #[must_use]
    pub fn new(children: Vec<Box<dyn SortedIterator<Item = T>>>) -> Self {
        Self {
            children,
            heap: BinaryHeap::new(),
            initialized: false,
            fetched: None,
            last_emitted: None,
            state: IterState::Empty,
        }
    }

    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        for (idx, child) in self.children.iter_mut().enumerate() {
            if let Some(value) = child.peek() {
                self.heap.push(Reverse(HeapEntry(value.clone(), idx)));
            }
        }
        self.initialized = true;
    }

    fn ensure_fetched(&mut self) {
        if !matches!(self.state, IterState::Empty) {
            return;
        }
        self.initialize();

        sink::record(MetricsEvent::IteratorMergeFanIn {
            width: self.heap.len() as u64,
        });

        match self.heap.pop() {
            Some(Reverse(HeapEntry(value, idx))) => {
                self.children[idx].next();
                if let Some(next_value) = self.children[idx].peek() {
                    self.heap
                        .push(Reverse(HeapEntry(next_value.clone(), idx)));
                }
                self.fetched = Some(value);
                self.state = IterState::Fetched;
            }
            None => self.state = IterState::Completed,
        }
    }
}

impl<T: Ord + Clone + std::fmt::Debug> SortedIterator for Merge<T> {
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
        sink::record(MetricsEvent::IteratorSeek);

        if let Some(fetched) = &self.fetched
            && target <= fetched
        {
            return Ok(());
        }

        self.initialize();
        self.fetched = None;
        self.state = IterState::Empty;
        self.heap.clear();
        for (idx, child) in self.children.iter_mut().enumerate() {
            child.seek(target)?;
            if let Some(value) = child.peek() {
                self.heap.push(Reverse(HeapEntry(value.clone(), idx)));
            }
        }
        Ok(())
    }

    fn recycle(&mut self) {
        for child in &mut self.children {
            child.recycle();
        }
        self.heap.clear();
        self.fetched = None;
        self.state = IterState::Completed;
    }
}
