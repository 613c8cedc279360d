//! Vertex IID: `prefix | typeSegment | instanceSegment` (spec.md §3).
//!
//! Type vertices omit the instance segment, using the type segment itself as
//! a scope-local id. Thing vertices carry both: the type segment buckets
//! instances by type, and the instance segment is assigned by the
//! [`super::generator::KeyGenerator`] — except for attribute vertices, whose
//! instance segment is content-addressed from the attribute's type and value
//! so that two writes of the same typed value collapse onto one vertex.

use super::prefix::VertexKind;
use sha2::{Digest, Sha256};
use std::fmt;

const TYPE_SEGMENT_SIZE: usize = 8;
const INSTANCE_SEGMENT_SIZE: usize = 8;
const TYPE_VERTEX_SIZE: usize = 1 + TYPE_SEGMENT_SIZE;
const THING_VERTEX_SIZE: usize = 1 + TYPE_SEGMENT_SIZE + INSTANCE_SEGMENT_SIZE;

#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VertexIID(Vec<u8>);

impl VertexIID {
    /// Build a type (schema) vertex IID from its scope-local id.
    #[must_use]
    pub fn type_vertex(kind: VertexKind, type_id: u64) -> Self {
        assert!(kind.is_type(), "type_vertex called with a thing VertexKind");
        let mut buf = Vec::with_capacity(TYPE_VERTEX_SIZE);
        buf.push(kind.tag());
        buf.extend_from_slice(&type_id.to_be_bytes());
        Self(buf)
    }

    /// Build a thing (instance) vertex IID from its owning type and an
    /// already-assigned instance id (see [`super::generator::KeyGenerator`]).
    #[must_use]
    pub fn thing_vertex(kind: VertexKind, type_id: u64, instance_id: u64) -> Self {
        assert!(!kind.is_type(), "thing_vertex called with a type VertexKind");
        let mut buf = Vec::with_capacity(THING_VERTEX_SIZE);
        buf.push(kind.tag());
        buf.extend_from_slice(&type_id.to_be_bytes());
        buf.extend_from_slice(&instance_id.to_be_bytes());
        Self(buf)
    }

    /// Build a content-addressed attribute vertex IID: the instance segment
    /// is derived from `sha256(type_id || value_bytes)`, so two writes of
    /// the same typed value produce the identical vertex (spec.md §3).
    #[must_use]
    pub fn attribute_vertex(type_id: u64, value_bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(type_id.to_be_bytes());
        hasher.update(value_bytes);
        let digest = hasher.finalize();
        let mut instance_bytes = [0u8; INSTANCE_SEGMENT_SIZE];
        instance_bytes.copy_from_slice(&digest[..INSTANCE_SEGMENT_SIZE]);
        let instance_id = u64::from_be_bytes(instance_bytes);
        Self::thing_vertex(VertexKind::Attribute, type_id, instance_id)
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, &'static str> {
        let (tag, len) = match bytes.len() {
            TYPE_VERTEX_SIZE => (bytes[0], TYPE_VERTEX_SIZE),
            THING_VERTEX_SIZE => (bytes[0], THING_VERTEX_SIZE),
            _ => return Err("corrupted VertexIID: invalid size"),
        };
        let Some(kind) = VertexKind::from_tag(tag) else {
            return Err("corrupted VertexIID: invalid prefix tag");
        };
        let expect_type_shape = len == TYPE_VERTEX_SIZE;
        if kind.is_type() != expect_type_shape {
            return Err("corrupted VertexIID: prefix/shape mismatch");
        }
        Ok(Self(bytes.to_vec()))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn kind(&self) -> VertexKind {
        VertexKind::from_tag(self.0[0]).expect("VertexIID always carries a valid tag")
    }

    #[must_use]
    pub fn type_id(&self) -> u64 {
        let mut buf = [0u8; TYPE_SEGMENT_SIZE];
        buf.copy_from_slice(&self.0[1..1 + TYPE_SEGMENT_SIZE]);
        u64::from_be_bytes(buf)
    }

    /// `None` for type vertices; `Some` for thing vertices.
    #[must_use]
    pub fn instance_id(&self) -> Option<u64> {
        if self.0.len() == TYPE_VERTEX_SIZE {
            return None;
        }
        let mut buf = [0u8; INSTANCE_SEGMENT_SIZE];
        buf.copy_from_slice(&self.0[1 + TYPE_SEGMENT_SIZE..]);
        Some(u64::from_be_bytes(buf))
    }
}

impl fmt::Debug for VertexIID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance_id() {
            Some(instance) => write!(
                f,
                "VertexIID({}, type={}, instance={})",
                self.kind(),
                self.type_id(),
                instance
            ),
            None => write!(f, "VertexIID({}, type={})", self.kind(), self.type_id()),
        }
    }
}

impl fmt::Display for VertexIID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl AsRef<[u8]> for VertexIID {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
