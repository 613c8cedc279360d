//! Diagnostics snapshot (SPEC_FULL.md "Diagnostics snapshot" supplement).
//!
//! Grounded in `icydb-core/src/db/diagnostics/snapshot/mod.rs`'s
//! store-level snapshot structs: pure read-only introspection over buffered
//! state, with no new mutation semantics. Useful for the cross-module test
//! suite (e.g. asserting a scenario buffered exactly the edges it expected
//! before committing) and for embedders debugging a stuck traversal.

use crate::{graph::Graph, iid::Encoding, storage::Storage};
use std::collections::HashMap;

///
/// DiagnosticsSnapshot
///

#[derive(Clone, Debug, Default)]
pub struct DiagnosticsSnapshot {
    pub buffered_vertex_count: u64,
    pub buffered_edge_counts: HashMap<Encoding, u64>,
}

impl DiagnosticsSnapshot {
    #[must_use]
    pub fn capture<S: Storage>(graph: &Graph<S>) -> Self {
        Self {
            buffered_vertex_count: graph.buffered_vertex_count(),
            buffered_edge_counts: graph.buffered_edge_counts(),
        }
    }

    /// Total buffered edges across every encoding.
    #[must_use]
    pub fn buffered_edge_total(&self) -> u64 {
        self.buffered_edge_counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{iid::VertexKind, storage::memory::MemoryStorage};

    #[test]
    fn snapshot_reflects_buffered_vertices_before_commit() {
        let graph = Graph::new(MemoryStorage::new(), crate::iid::KeyGenerator::new());
        graph
            .create_type(VertexKind::EntityType, "person", None)
            .expect("create_type should succeed");

        let snapshot = DiagnosticsSnapshot::capture(&graph);
        assert_eq!(snapshot.buffered_vertex_count, 1);
        assert_eq!(snapshot.buffered_edge_total(), 0);
    }
}
