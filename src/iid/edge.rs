//! Edge view IID: `ownerIID | infix | adjacentIID [ | suffix ]` (spec.md §3).
//!
//! Every edge has two views — forward (keyed by `from`) and backward (keyed
//! by `to`) — with distinct IIDs because the infix encodes direction. The
//! view IID is the sole comparison key for ordering buffered and persisted
//! edges (spec.md §4.4 "Ordering").

use super::{
    encoding::{Direction, Encoding},
    vertex::VertexIID,
};
use std::fmt;

#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EdgeViewIID(Vec<u8>);

impl EdgeViewIID {
    /// Build an edge view IID. `role_instance` must be `Some` iff `encoding`
    /// is the optimised `RolePlayer` shape (spec.md §3, §4.4); this is an
    /// internal-error condition, not a caller-facing one, since encoding
    /// selection is always made by this crate's own adjacency layer.
    #[must_use]
    pub fn new(
        owner: &VertexIID,
        encoding: Encoding,
        direction: Direction,
        adjacent: &VertexIID,
        role_instance: Option<&VertexIID>,
    ) -> Self {
        assert_eq!(
            encoding.is_optimised(),
            role_instance.is_some(),
            "role_instance suffix presence must match encoding.is_optimised()"
        );

        let mut buf = Vec::with_capacity(
            owner.as_bytes().len()
                + 1
                + adjacent.as_bytes().len()
                + role_instance.map_or(0, |r| r.as_bytes().len()),
        );
        buf.extend_from_slice(owner.as_bytes());
        buf.push(encoding.infix(direction));
        buf.extend_from_slice(adjacent.as_bytes());
        if let Some(role_instance) = role_instance {
            buf.extend_from_slice(role_instance.as_bytes());
        }
        Self(buf)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EdgeViewIID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeViewIID({} bytes)", self.0.len())
    }
}

impl AsRef<[u8]> for EdgeViewIID {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
