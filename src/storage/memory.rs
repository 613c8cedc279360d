//! In-memory reference [`Storage`] implementation, `BTreeMap`-backed so its
//! natural iteration order already matches the byte-lexicographic order the
//! rest of the crate relies on. Used by the transaction layer's tests and by
//! the adjacency overlay's "Read" and "Write-over-persisted" variants in
//! this crate's own test suite.

use super::{Entry, Storage, StorageError};
use crate::iter::{SortedIterator, VecSortedIterator};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), StorageError> {
        self.entries.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn iterate(
        &self,
        prefix: &[u8],
    ) -> Result<Box<dyn SortedIterator<Item = Entry>>, StorageError> {
        let matching: Vec<Entry> = self
            .entries
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| Entry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        Ok(Box::new(VecSortedIterator::new(matching)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterate_returns_only_matching_prefix_in_order() {
        let mut storage = MemoryStorage::new();
        storage.put(vec![1, 0], vec![]).unwrap();
        storage.put(vec![1, 2], vec![]).unwrap();
        storage.put(vec![2, 0], vec![]).unwrap();
        storage.put(vec![1, 1], vec![]).unwrap();

        let mut iter = storage.iterate(&[1]).unwrap();
        let mut keys = Vec::new();
        while let Some(entry) = iter.next() {
            keys.push(entry.key);
        }
        assert_eq!(keys, vec![vec![1, 0], vec![1, 1], vec![1, 2]]);
    }

    #[test]
    fn delete_removes_entry() {
        let mut storage = MemoryStorage::new();
        storage.put(vec![1], vec![9]).unwrap();
        storage.delete(&[1]).unwrap();
        assert_eq!(storage.get(&[1]).unwrap(), None);
    }

    #[test]
    fn put_overwrites_existing_value() {
        let mut storage = MemoryStorage::new();
        storage.put(vec![1], vec![9]).unwrap();
        storage.put(vec![1], vec![10]).unwrap();
        assert_eq!(storage.get(&[1]).unwrap(), Some(vec![10]));
    }
}
