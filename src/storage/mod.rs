//! Storage Façade (spec.md §4.1): the opaque ordered key/value store this
//! crate is built on top of.
//!
//! Everything above this module treats keys and values as immutable byte
//! strings; byte-lexicographic order on the key is the only order the rest
//! of the crate ever relies on. Grounded in the teacher's `db/store`
//! key/value layer shape (`db/store/key.rs`, `db/store/data.rs`) and its
//! `StoreError` (`db/store/error.rs`), generalised from the teacher's
//! canister-stable-memory backend to a pluggable trait since this crate has
//! no canister runtime underneath it.

pub mod memory;

use crate::iter::SortedIterator;
use std::fmt;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error("key not found: {key:?}")]
    NotFound { key: Vec<u8> },
    #[error("storage corruption: {message}")]
    Corrupt { message: String },
    #[error("storage invariant violated: {message}")]
    InvariantViolation { message: String },
}

/// A single stored entry, returned from [`Storage::iterate`].
#[derive(Clone, Eq, PartialEq)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The opaque ordered key/value store (spec.md §4.1).
///
/// `iterate` returns a lazy, ascending, forwardable [`SortedIterator`] over
/// entries whose key starts with `prefix`. Implementations must tolerate a
/// concurrent `put`/`delete` by the same transaction at keys the returned
/// stream does not currently hold open — in practice this means
/// implementations materialize the matching key range eagerly rather than
/// holding a live cursor into mutable state.
pub trait Storage {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), StorageError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), StorageError>;

    fn iterate(
        &self,
        prefix: &[u8],
    ) -> Result<Box<dyn SortedIterator<Item = Entry>>, StorageError>;
}
