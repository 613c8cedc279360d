//! The typed graph facade (spec.md §2 overview, §4.3/§4.4): owns a
//! [`Storage`] handle plus the per-transaction [`VertexCatalogue`] and
//! [`adjacency::AdjacencyStore`] overlays, and exposes vertex and edge
//! operations that read through both.
//!
//! Grounded in the teacher's `db/registry.rs` `StoreHandle` (`LocalKey<RefCell<_>>`
//! with `with_borrow`/`with_borrow_mut` closures) — generalised here from a
//! thread-local, process-wide handle to an owned, per-transaction one
//! (`Rc<RefCell<_>>` rather than `thread_local!`), matching spec.md §9's
//! explicit rejection of global/thread-local scope for anything
//! transaction-correctness-relevant. Every [`Adjacency`] this module builds
//! is constructed and dropped within one method body, borrowing `storage`
//! and `adjacency` as two disjoint fields of the same `&mut GraphState` —
//! it never escapes as a return value, so no lifetime threads through the
//! public API.

pub mod adjacency;
pub mod edge_entity;
pub mod vertex_catalogue;

use crate::{
    error::{ErrorOrigin, GraphError, GraphResult},
    iid::{Direction, Encoding, KeyGenerator, VertexIID, VertexKind},
    iter::SortedIterator,
    model::vertex::{ThingVertex, TypeVertex, Vertex},
    storage::Storage,
};
use adjacency::{Adjacency, AdjacencyStore};
use edge_entity::EdgeEntity;
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use vertex_catalogue::VertexCatalogue;

struct GraphState<S: Storage> {
    storage: S,
    catalogue: VertexCatalogue,
    adjacency: AdjacencyStore,
    /// Set for a [`crate::txn::TransactionMode::Read`] transaction
    /// (spec.md §4.4 `Posture::Read`: "Mutates? no"). Every mutating
    /// method below checks this before touching the catalogue or
    /// adjacency overlay.
    read_only: bool,
}

/// Shared handle to one transaction's graph state. Cloning a [`Graph`]
/// shares the same underlying state (spec.md §4.4: a mirrored `put` on one
/// vertex's adjacency must be visible through another vertex's own handle),
/// matching the teacher's registry-handle-is-a-reference idiom.
pub struct Graph<S: Storage> {
    state: Rc<RefCell<GraphState<S>>>,
}

impl<S: Storage> Clone for Graph<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<S: Storage> Graph<S> {
    #[must_use]
    pub fn new(storage: S, key_gen: KeyGenerator) -> Self {
        Self {
            state: Rc::new(RefCell::new(GraphState {
                storage,
                catalogue: VertexCatalogue::new(key_gen),
                adjacency: AdjacencyStore::default(),
                read_only: false,
            })),
        }
    }

    /// Reject every subsequent mutating call with `InvalidState` (spec.md
    /// §4.4 `Posture::Read`). Called once by
    /// [`crate::txn::Transaction::open`] when opening in
    /// [`crate::txn::TransactionMode::Read`]; there is no way to clear the
    /// flag afterward, matching a transaction's mode being fixed for its
    /// whole lifetime.
    pub(crate) fn set_read_only(&self) {
        self.state.borrow_mut().read_only = true;
    }

    fn ensure_mutable(state: &GraphState<S>) -> GraphResult<()> {
        if state.read_only {
            return Err(GraphError::invalid_state(
                ErrorOrigin::Transaction,
                "a read-only transaction cannot mutate the graph",
            ));
        }
        Ok(())
    }

    /// Reclaim the storage handle this graph was built over, e.g. to open
    /// the next transaction in the same session (spec.md §5, used by
    /// [`crate::txn::Transaction::into_storage`]).
    ///
    /// Panics if another `Graph` clone sharing this state is still alive.
    #[must_use]
    pub fn into_storage(self) -> S {
        let state = Rc::try_unwrap(self.state)
            .unwrap_or_else(|_| panic!("into_storage called while another Graph handle clone is still alive"));
        state.into_inner().storage
    }

    /// Look up any vertex by IID (spec.md §4.3), buffer-then-storage.
    pub fn vertex(&self, iid: &VertexIID) -> GraphResult<Option<Vertex>> {
        let state = self.state.borrow();
        state.catalogue.get(&state.storage, iid)
    }

    /// Look up a type vertex by its scoped label (spec.md §4.3).
    pub fn type_by_label(&self, scoped_label: &str) -> GraphResult<Option<TypeVertex>> {
        let state = self.state.borrow();
        state.catalogue.type_by_label(&state.storage, scoped_label)
    }

    /// Create a buffered type vertex (spec.md §3/§4.3).
    pub fn create_type(
        &self,
        kind: VertexKind,
        label: impl Into<String>,
        scope: Option<String>,
    ) -> GraphResult<TypeVertex> {
        let mut state = self.state.borrow_mut();
        Self::ensure_mutable(&state)?;
        let GraphState { storage, catalogue, .. } = &mut *state;
        catalogue.create_type(storage, kind, label, scope)
    }

    /// Create a buffered thing vertex with a freshly generated instance id.
    pub fn create_thing(&self, kind: VertexKind, type_iid: VertexIID) -> GraphResult<ThingVertex> {
        let mut state = self.state.borrow_mut();
        Self::ensure_mutable(&state)?;
        Ok(state.catalogue.create_thing(kind, type_iid))
    }

    /// Create, or idempotently rediscover, a content-addressed attribute
    /// vertex (spec.md §3).
    pub fn create_attribute(&self, type_iid: &VertexIID, value_bytes: &[u8]) -> GraphResult<ThingVertex> {
        let mut state = self.state.borrow_mut();
        Self::ensure_mutable(&state)?;
        let GraphState { storage, catalogue, .. } = &mut *state;
        catalogue.create_attribute(storage, type_iid, value_bytes)
    }

    /// Rename (and/or re-scope) a type vertex (spec.md §4.3, §8.2 scenario 1).
    pub fn rename_type(
        &self,
        iid: &VertexIID,
        new_label: impl Into<String>,
        new_scope: Option<String>,
    ) -> GraphResult<()> {
        let mut state = self.state.borrow_mut();
        Self::ensure_mutable(&state)?;
        let GraphState { storage, catalogue, .. } = &mut *state;
        catalogue.rename_type(storage, iid, new_label, new_scope)
    }

    /// Delete a vertex and every edge touching it, on both endpoints (spec.md
    /// §8.2 "Delete completeness", §8 "Mirror consistency"). A persisted
    /// edge keyed by this vertex as owner is swept at [`Self::commit`] time
    /// the same way every other key under this vertex's own prefix is
    /// (`VertexCatalogue::commit`'s prefix sweep). The *mirror* view of that
    /// same edge, registered under the adjacent vertex's own IID prefix,
    /// would not be touched by that sweep, so this method walks every
    /// incident edge up front and removes the adjacent-side registration
    /// itself — immediately for a buffered mirror, queued for commit-time
    /// deletion for a persisted one.
    pub fn delete_vertex(&self, iid: &VertexIID) -> GraphResult<()> {
        let mut state = self.state.borrow_mut();
        Self::ensure_mutable(&state)?;
        let is_new = state.catalogue.is_new(iid);
        let GraphState { storage, catalogue, adjacency } = &mut *state;

        for direction in [Direction::Forward, Direction::Backward] {
            let incident = Adjacency::new(iid.clone(), direction, is_new, false, adjacency).full_scan(&*storage)?;
            for (edge, from_persisted) in incident {
                let adjacent = match direction {
                    Direction::Forward => edge.to.clone(),
                    Direction::Backward => edge.from.clone(),
                };
                if &adjacent == iid {
                    // A reflexive edge's only registrations are both under
                    // this vertex's own prefix, already swept below.
                    continue;
                }
                let mirror_direction = direction.flip();
                if from_persisted {
                    let mirror_view = match mirror_direction {
                        Direction::Forward => edge.forward_view(),
                        Direction::Backward => edge.backward_view(),
                    };
                    adjacency.schedule_persisted_removal(mirror_view.as_bytes().to_vec());
                } else {
                    let adjacent_is_new = catalogue.is_new(&adjacent);
                    Adjacency::new(adjacent, mirror_direction, adjacent_is_new, false, adjacency).remove(&edge);
                }
            }
        }

        catalogue.delete(storage, iid)?;
        Adjacency::new(iid.clone(), Direction::Forward, is_new, false, adjacency).delete_all();
        Adjacency::new(iid.clone(), Direction::Backward, is_new, false, adjacency).delete_all();
        Ok(())
    }

    /// Point lookup of a single outgoing edge (spec.md §4.4).
    pub fn out_edge(
        &self,
        owner: &VertexIID,
        encoding: Encoding,
        adjacent: &VertexIID,
        role_instance: Option<&VertexIID>,
    ) -> GraphResult<Option<EdgeEntity>> {
        let mut state = self.state.borrow_mut();
        let is_new = state.catalogue.is_new(owner);
        let read_only = state.read_only;
        let GraphState { storage, adjacency, .. } = &mut *state;
        let found = Adjacency::new(owner.clone(), Direction::Forward, is_new, read_only, adjacency)
            .edge_with_role(&*storage, encoding, adjacent, role_instance)?;
        Ok(found.map(EdgeEntity::new))
    }

    /// Point lookup of a single incoming edge.
    pub fn in_edge(
        &self,
        owner: &VertexIID,
        encoding: Encoding,
        adjacent: &VertexIID,
        role_instance: Option<&VertexIID>,
    ) -> GraphResult<Option<EdgeEntity>> {
        let mut state = self.state.borrow_mut();
        let is_new = state.catalogue.is_new(owner);
        let read_only = state.read_only;
        let GraphState { storage, adjacency, .. } = &mut *state;
        let found = Adjacency::new(owner.clone(), Direction::Backward, is_new, read_only, adjacency)
            .edge_with_role(&*storage, encoding, adjacent, role_instance)?;
        Ok(found.map(EdgeEntity::new))
    }

    /// Prefix scan of `owner`'s outgoing edges by lookahead (spec.md §4.4);
    /// materialised eagerly into a `Vec` since the transient [`Adjacency`]
    /// this builds cannot outlive the `RefCell` borrow this method holds.
    pub fn out_edges(
        &self,
        owner: &VertexIID,
        encoding: Encoding,
        adjacent: &VertexIID,
        role_type: Option<&VertexIID>,
        lookahead_depth: usize,
    ) -> GraphResult<Vec<EdgeEntity>> {
        let mut state = self.state.borrow_mut();
        let is_new = state.catalogue.is_new(owner);
        let read_only = state.read_only;
        let GraphState { storage, adjacency, .. } = &mut *state;
        let mut stream = Adjacency::new(owner.clone(), Direction::Forward, is_new, read_only, adjacency)
            .edges(&*storage, encoding, adjacent, role_type, lookahead_depth)?;
        let mut out = Vec::new();
        while let Some(view_edge) = stream.next() {
            out.push(EdgeEntity::new(view_edge.edge));
        }
        Ok(out)
    }

    /// Prefix scan of `owner`'s incoming edges by lookahead; mirrors
    /// [`Self::out_edges`] over `Direction::Backward`, needed by traversal
    /// steps that walk an edge against its natural direction (spec.md §6
    /// "Vertex.ins()").
    pub fn in_edges(
        &self,
        owner: &VertexIID,
        encoding: Encoding,
        adjacent: &VertexIID,
        role_type: Option<&VertexIID>,
        lookahead_depth: usize,
    ) -> GraphResult<Vec<EdgeEntity>> {
        let mut state = self.state.borrow_mut();
        let is_new = state.catalogue.is_new(owner);
        let read_only = state.read_only;
        let GraphState { storage, adjacency, .. } = &mut *state;
        let mut stream = Adjacency::new(owner.clone(), Direction::Backward, is_new, read_only, adjacency)
            .edges(&*storage, encoding, adjacent, role_type, lookahead_depth)?;
        let mut out = Vec::new();
        while let Some(view_edge) = stream.next() {
            out.push(EdgeEntity::new(view_edge.edge));
        }
        Ok(out)
    }

    /// Enumerate every instance of `type_iid`, buffered and persisted
    /// (spec.md §4.6 "materialize the starting vertex iterator … using its
    /// properties"). Existence keys are bare `vertexIID → empty` (spec.md
    /// §6 key layout row 1), so a type's persisted instances are exactly
    /// the existence keys under the prefix `tag ++ typeId`; longer keys
    /// under that same byte prefix (edge views, which also start with the
    /// owning thing's IID) are filtered out because they fail
    /// `VertexIID::try_from_bytes`'s fixed-size check.
    pub fn instances_of_type(&self, type_iid: &VertexIID) -> GraphResult<Vec<VertexIID>> {
        let state = self.state.borrow();
        let instance_kind = type_iid
            .kind()
            .instance_kind()
            .expect("instances_of_type called with a type-kind VertexIID");
        let mut prefix = vec![instance_kind.tag()];
        prefix.extend_from_slice(&type_iid.type_id().to_be_bytes());

        let mut scan = state
            .storage
            .iterate(&prefix)
            .map_err(|err| GraphError::storage_failure(ErrorOrigin::Traversal, err))?;
        let mut out = Vec::new();
        while let Some(entry) = scan.next() {
            if let Ok(iid) = VertexIID::try_from_bytes(&entry.key)
                && !state.catalogue.is_deleted(&iid)
            {
                out.push(iid);
            }
        }
        out.extend(state.catalogue.buffered_things_of_type(type_iid));
        Ok(out)
    }

    /// Buffer a new outgoing edge, mirroring it onto `adjacent`'s incoming
    /// adjacency (spec.md §4.4 `put`).
    pub fn put_out_edge(
        &self,
        owner: &VertexIID,
        encoding: Encoding,
        adjacent: &VertexIID,
        role: Option<(VertexIID, VertexIID)>,
        is_inferred: bool,
    ) -> GraphResult<EdgeEntity> {
        let mut state = self.state.borrow_mut();
        Self::ensure_mutable(&state)?;
        let is_new = state.catalogue.is_new(owner);
        let GraphState { adjacency, .. } = &mut *state;
        let edge = Adjacency::new(owner.clone(), Direction::Forward, is_new, false, adjacency)
            .put(encoding, adjacent, role, is_inferred)?;
        Ok(EdgeEntity::new(edge))
    }

    /// Remove one buffered outgoing edge by value.
    pub fn remove_out_edge(&self, owner: &VertexIID, entity: &EdgeEntity) -> GraphResult<()> {
        let mut state = self.state.borrow_mut();
        Self::ensure_mutable(&state)?;
        let is_new = state.catalogue.is_new(owner);
        let GraphState { adjacency, .. } = &mut *state;
        Adjacency::new(owner.clone(), Direction::Forward, is_new, false, adjacency).remove(entity.as_edge());
        Ok(())
    }

    /// Commit every modified vertex's buffered adjacency and catalogue state
    /// to storage (spec.md §4.3 `commit`, §4.4 `commit`), then apply every
    /// queued persisted-mirror-view removal (spec.md §8 "Mirror
    /// consistency").
    pub fn commit(&self) -> GraphResult<()> {
        let mut state = self.state.borrow_mut();
        Self::ensure_mutable(&state)?;
        let GraphState { storage, catalogue, adjacency } = &mut *state;

        let modified: Vec<VertexIID> = adjacency.modified_vertices().cloned().collect();
        for owner in &modified {
            Adjacency::new(owner.clone(), Direction::Forward, false, false, adjacency).commit(storage)?;
        }
        adjacency.clear_modified();

        for key in adjacency.drain_pending_removals() {
            storage
                .delete(&key)
                .map_err(|err| GraphError::storage_failure(ErrorOrigin::Adjacency, err))?;
        }

        catalogue.commit(storage)
    }

    /// Buffered vertex count (read-only introspection, see
    /// [`crate::txn::diagnostics`]).
    #[must_use]
    pub fn buffered_vertex_count(&self) -> u64 {
        self.state.borrow().catalogue.buffered_vertex_count()
    }

    /// Buffered edge count per encoding, forward view only (read-only
    /// introspection, see [`crate::txn::diagnostics`]).
    #[must_use]
    pub fn buffered_edge_counts(&self) -> HashMap<Encoding, u64> {
        self.state.borrow().adjacency.buffered_edge_counts()
    }
}
