//! Structured runtime errors with a stable internal classification.
//!
//! Grounded in the teacher crate's `InternalError` (`icydb-core/src/error.rs`):
//! one `thiserror`-derived struct carrying a `(class, origin, message)` triple
//! rather than one enum variant per failure site, because the same class
//! (e.g. `InvalidState`) can legitimately originate from several subsystems.

use crate::storage::StorageError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// GraphError
///
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{origin}:{class}: {message}")]
pub struct GraphError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
    pub storage: Option<StorageError>,
}

impl GraphError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            storage: None,
        }
    }

    /// `InvalidStateError` — iterator in an unexpected internal state.
    ///
    /// Per spec.md §4.2, out-of-order emission and state-machine misuse are
    /// programmer errors, not recoverable runtime conditions.
    pub fn invalid_state(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidState, origin, message)
    }

    /// `InvalidArgumentError` — seek to a target smaller than the last emitted element.
    pub fn seek_backward(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidArgument, origin, message)
    }

    /// `IllegalSchemaMutation` — rename collision or a supertype cycle.
    pub fn illegal_schema_mutation(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::IllegalSchemaMutation,
            ErrorOrigin::VertexCatalogue,
            message,
        )
    }

    pub fn storage_failure(origin: ErrorOrigin, err: StorageError) -> Self {
        Self {
            class: ErrorClass::StorageFailure,
            origin,
            message: err.to_string(),
            storage: Some(err),
        }
    }

    #[must_use]
    pub const fn is_illegal_schema_mutation(&self) -> bool {
        matches!(self.class, ErrorClass::IllegalSchemaMutation)
    }
}

///
/// ErrorClass
///
/// Internal error taxonomy for runtime classification. Mirrors spec.md §7
/// exactly: `MissingVertex`/`MissingEdge` are deliberately absent — per spec
/// they surface as an absent `Option`, never as an error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidState,
    InvalidArgument,
    IllegalSchemaMutation,
    Corruption,
    StorageFailure,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidState => "invalid_state",
            Self::InvalidArgument => "invalid_argument",
            Self::IllegalSchemaMutation => "illegal_schema_mutation",
            Self::Corruption => "corruption",
            Self::StorageFailure => "storage_failure",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///
/// Subsystem taxonomy, one variant per component in spec.md §2's table.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Storage,
    Iterator,
    VertexCatalogue,
    Adjacency,
    Edge,
    Traversal,
    Transaction,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Storage => "storage",
            Self::Iterator => "iterator",
            Self::VertexCatalogue => "vertex_catalogue",
            Self::Adjacency => "adjacency",
            Self::Edge => "edge",
            Self::Traversal => "traversal",
            Self::Transaction => "transaction",
        };
        write!(f, "{label}")
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
