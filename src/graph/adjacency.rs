//! Adjacency overlay (spec.md §4.4) — the central subsystem.
//!
//! For each `(vertex, direction)` there is an adjacency view over edges
//! filtered by encoding and prefix lookahead. An edge is visible through
//! *three variants* depending on transaction posture (spec.md §4.4 table):
//! `Read` (storage only), `WriteOverBuffered` (buffer only — the vertex is
//! new this transaction, so storage cannot yet hold anything under its
//! IID), and `WriteOverPersisted` (both, merged with `distinct`).
//!
//! Grounded in the teacher's multi-axis-variant note from spec.md §9 ("model
//! as a pair of independent capability interfaces... avoid deep
//! inheritance") and in the teacher's `db/cursor` wrapper-iterator style for
//! how storage scans get layered with decode/filter stages
//! (`db/executor/storage_port.rs`'s key-handle indirection is the closest
//! analogue the teacher has to an owner-scoped view over a byte-keyed
//! store).

use crate::{
    error::{ErrorOrigin, GraphError, GraphResult},
    iid::{Direction, EdgeViewIID, Encoding, VertexIID},
    iter::{Distinct, Merge, SortedIterator, VecSortedIterator},
    model::edge::Edge,
    obs::sink::{self, MetricsEvent},
    storage::Storage,
};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Lookahead chain-prefix bytes used both as the buffered trie's bucket key
/// and, for base encodings, as a literal prefix of the real storage key
/// (spec.md §4.4 "Lookahead index"). `adjacentPrefix ++ adjacentType` is a
/// 9-byte value that is always a true prefix of `adjacent`'s own IID bytes,
/// since every [`VertexIID`] starts with `tag ++ typeSegment`
/// (spec.md §3) — so base lookahead components double as real storage
/// prefixes for free.
fn base_lookahead_components(adjacent: &VertexIID) -> Vec<Vec<u8>> {
    vec![
        vec![adjacent.kind().tag()],
        adjacent.type_id().to_be_bytes().to_vec(),
    ]
}

/// ROLEPLAYER lookahead chain: `roleType ++ adjacentPrefix ++ adjacentType`
/// (spec.md §4.4: "prepending the roleType id to the lookahead"). Unlike the
/// base case, `roleType` is not a prefix of the real on-disk key (whose
/// bytes are `owner | infix | adjacent | roleInstance`), so persisted reads
/// recompute this chain per candidate and filter rather than relying on a
/// literal storage-key prefix match.
fn role_player_lookahead_components(role_type: &VertexIID, adjacent: &VertexIID) -> Vec<Vec<u8>> {
    let mut components = vec![role_type.as_bytes().to_vec()];
    components.extend(base_lookahead_components(adjacent));
    components
}

fn chain_prefix_bytes(infix: u8, components: &[Vec<u8>], depth: usize) -> Vec<u8> {
    let mut bytes = vec![infix];
    for component in &components[..depth] {
        bytes.extend_from_slice(component);
    }
    bytes
}

/// Per-`(owner, direction)` buffered edge bucket: the lookahead index
/// described in spec.md §4.4.
#[derive(Default)]
struct AdjacencyBucket {
    /// `edges` map: chain-prefix bytes (at every depth, not only the
    /// deepest) to the ordered set of view IIDs whose chain starts with
    /// that prefix. Storing every depth's aggregate directly (rather than
    /// only leaf buckets plus a separate reconstruction trie) trades a
    /// little memory for not needing a merge-walk at read time.
    by_chain_prefix: HashMap<Vec<u8>, BTreeSet<EdgeViewIID>>,
    /// `infixes` map: a shorter chain prefix to the one-component-longer
    /// prefixes registered under it (spec.md §4.4); kept for structural
    /// fidelity even though `by_chain_prefix` alone already answers every
    /// query this module issues.
    children: HashMap<Vec<u8>, HashSet<Vec<u8>>>,
    /// Full edge metadata, keyed by the view IID relevant to this bucket's
    /// direction (forward view for an `outs` bucket, backward for `ins`).
    payload: HashMap<EdgeViewIID, Edge>,
}

impl AdjacencyBucket {
    fn insert(&mut self, view: EdgeViewIID, chain: &[Vec<u8>], infix: u8, edge: Edge) {
        for depth in 0..=chain.len() {
            let prefix = chain_prefix_bytes(infix, chain, depth);
            self.by_chain_prefix
                .entry(prefix.clone())
                .or_default()
                .insert(view.clone());
            if depth > 0 {
                let parent = chain_prefix_bytes(infix, chain, depth - 1);
                self.children.entry(parent).or_default().insert(prefix);
            }
        }
        self.payload.insert(view, edge);
    }

    fn remove(&mut self, view: &EdgeViewIID, chain: &[Vec<u8>], infix: u8) {
        for depth in 0..=chain.len() {
            let prefix = chain_prefix_bytes(infix, chain, depth);
            if let Some(set) = self.by_chain_prefix.get_mut(&prefix) {
                set.remove(view);
            }
        }
        self.payload.remove(view);
    }
}

/// Transaction posture determining what an [`Adjacency`] view may see
/// (spec.md §4.4 table).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Posture {
    Read,
    WriteOverBuffered,
    WriteOverPersisted,
}

/// Shared, transaction-scoped home for every vertex's adjacency buckets, in
/// both directions. One instance is shared (via [`crate::graph::Graph`])
/// across every [`Adjacency`] handle so that a mirrored `put` on one
/// endpoint is visible through the other endpoint's own handle.
#[derive(Default)]
pub(crate) struct AdjacencyStore {
    buckets: HashMap<(VertexIID, Direction), AdjacencyBucket>,
    modified: HashSet<VertexIID>,
    /// Persisted edge-view keys that must be deleted from storage at the
    /// next [`crate::graph::Graph::commit`], queued by operations (such as
    /// [`crate::graph::Graph::delete_vertex`]) that need to remove a mirror
    /// view registered under an *adjacent* vertex's own IID prefix — a key
    /// no per-vertex prefix sweep would otherwise reach (spec.md §8 "Mirror
    /// consistency").
    pending_removals: HashSet<Vec<u8>>,
}

impl AdjacencyStore {
    fn bucket_mut(&mut self, owner: &VertexIID, direction: Direction) -> &mut AdjacencyBucket {
        self.buckets
            .entry((owner.clone(), direction))
            .or_default()
    }

    fn bucket(&self, owner: &VertexIID, direction: Direction) -> Option<&AdjacencyBucket> {
        self.buckets.get(&(owner.clone(), direction))
    }

    pub(crate) fn is_modified(&self, iid: &VertexIID) -> bool {
        self.modified.contains(iid)
    }

    pub(crate) fn modified_vertices(&self) -> impl Iterator<Item = &VertexIID> {
        self.modified.iter()
    }

    pub(crate) fn clear_modified(&mut self) {
        self.modified.clear();
    }

    /// Queue a persisted edge-view key for deletion at the next commit.
    pub(crate) fn schedule_persisted_removal(&mut self, key: Vec<u8>) {
        self.pending_removals.insert(key);
    }

    /// Drain every queued persisted-view removal (spec.md §8 "Mirror
    /// consistency"), applied by [`crate::graph::Graph::commit`].
    pub(crate) fn drain_pending_removals(&mut self) -> Vec<Vec<u8>> {
        self.pending_removals.drain().collect()
    }

    /// Buffered edge count per encoding, forward-view buckets only (a
    /// mirrored edge is buffered in both its owner's and its adjacent's
    /// bucket, so counting both directions would double it). Read-only
    /// introspection for [`crate::txn::diagnostics`].
    pub(crate) fn buffered_edge_counts(&self) -> HashMap<Encoding, u64> {
        let mut counts = HashMap::new();
        for ((_, direction), bucket) in &self.buckets {
            if *direction != Direction::Forward {
                continue;
            }
            for edge in bucket.payload.values() {
                *counts.entry(edge.encoding).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// One vertex's view of its own adjacency in one direction, filtered to one
/// encoding at a time by the methods below (spec.md §4.4).
pub struct Adjacency<'s> {
    owner: VertexIID,
    direction: Direction,
    posture: Posture,
    store: &'s mut AdjacencyStore,
}

impl<'s> Adjacency<'s> {
    /// `storage_only` selects the `Read` posture (spec.md §4.4 table) used
    /// by a read-only transaction, where nothing is ever buffered so
    /// storage alone is authoritative. A write transaction must never pass
    /// `true` here: doing so would hide this owner's own buffered edges
    /// from a read issued moments after a `put` in the same transaction.
    /// Posture otherwise follows `is_new_vertex`: a vertex created this
    /// transaction cannot yet have persisted edges (`WriteOverBuffered`); an
    /// existing one merges both (`WriteOverPersisted`).
    pub(crate) fn new(
        owner: VertexIID,
        direction: Direction,
        is_new_vertex: bool,
        storage_only: bool,
        store: &'s mut AdjacencyStore,
    ) -> Self {
        let posture = if storage_only {
            Posture::Read
        } else if is_new_vertex {
            Posture::WriteOverBuffered
        } else {
            Posture::WriteOverPersisted
        };
        Self {
            owner,
            direction,
            posture,
            store,
        }
    }

    fn lookahead_for(&self, encoding: Encoding, adjacent: &VertexIID, role_type: Option<&VertexIID>) -> Vec<Vec<u8>> {
        match role_type {
            Some(role_type) => {
                assert!(encoding.is_optimised(), "role_type supplied for a non-optimised encoding");
                role_player_lookahead_components(role_type, adjacent)
            }
            None => base_lookahead_components(adjacent),
        }
    }

    /// Point lookup by adjacent vertex (spec.md §4.4 first bullet).
    pub fn edge<S: Storage>(&self, storage: &S, encoding: Encoding, adjacent: &VertexIID) -> GraphResult<Option<Edge>> {
        self.edge_with_role(storage, encoding, adjacent, None)
    }

    /// Point lookup for ROLEPLAYER edges, disambiguated by role instance.
    pub fn edge_with_role<S: Storage>(
        &self,
        storage: &S,
        encoding: Encoding,
        adjacent: &VertexIID,
        role_instance: Option<&VertexIID>,
    ) -> GraphResult<Option<Edge>> {
        let view = EdgeViewIID::new(&self.owner, encoding, self.direction, adjacent, role_instance);

        if self.posture != Posture::WriteOverBuffered
            && let Some(bytes) = storage
                .get(view.as_bytes())
                .map_err(|err| GraphError::storage_failure(ErrorOrigin::Adjacency, err))?
        {
            let (from, to) = match self.direction {
                Direction::Forward => (self.owner.clone(), adjacent.clone()),
                Direction::Backward => (adjacent.clone(), self.owner.clone()),
            };
            let mut edge = Edge::new(encoding, from, to, false);
            if let Some(role_instance) = role_instance {
                edge = edge.with_role_instance(role_instance.clone());
            }
            if !bytes.is_empty()
                && let Ok(overridden) = VertexIID::try_from_bytes(&bytes)
            {
                edge = edge.with_overridden(overridden);
            }
            return Ok(Some(edge));
        }

        if self.posture != Posture::Read
            && let Some(bucket) = self.store.bucket(&self.owner, self.direction)
        {
            return Ok(bucket.payload.get(&view).cloned());
        }

        Ok(None)
    }

    /// Prefix scan by lookahead (spec.md §4.4: base `edge(encoding.base,
    /// lookahead…)` and optimised `edge(encoding.optimised, roleType,
    /// lookahead…)`). `role_type` must be `Some` iff `encoding` is
    /// optimised; `lookahead_depth` selects how many of the encoding's
    /// lookahead components the adjacent vertex narrows the scan to (0
    /// means a full encoding-level scan).
    pub fn edges<S: Storage>(
        &self,
        storage: &S,
        encoding: Encoding,
        adjacent: &VertexIID,
        role_type: Option<&VertexIID>,
        lookahead_depth: usize,
    ) -> GraphResult<Box<dyn SortedIterator<Item = ViewOrderedEdge>>> {
        assert_eq!(
            encoding.is_optimised(),
            role_type.is_some(),
            "role_type presence must match encoding.is_optimised()"
        );
        let full_chain = self.lookahead_for(encoding, adjacent, role_type);
        assert!(
            lookahead_depth <= full_chain.len(),
            "lookahead_depth {lookahead_depth} exceeds this encoding's chain length {}",
            full_chain.len()
        );
        let infix = encoding.infix(self.direction);
        let prefix = chain_prefix_bytes(infix, &full_chain, lookahead_depth);

        let buffered: Vec<Edge> = match self.posture {
            Posture::Read => Vec::new(),
            _ => self
                .store
                .bucket(&self.owner, self.direction)
                .and_then(|bucket| bucket.by_chain_prefix.get(&prefix))
                .into_iter()
                .flat_map(|views| views.iter())
                .filter_map(|view| {
                    self.store
                        .bucket(&self.owner, self.direction)
                        .and_then(|bucket| bucket.payload.get(view))
                        .cloned()
                })
                .collect(),
        };

        let persisted: Vec<Edge> = if self.posture == Posture::WriteOverBuffered {
            Vec::new()
        } else {
            self.scan_persisted(storage, infix, &full_chain, lookahead_depth)?
        };

        let buffered_by_view: BTreeSet<ViewOrderedEdge> = buffered
            .into_iter()
            .map(|edge| ViewOrderedEdge::new(self.view_of(&edge), edge))
            .collect();
        let persisted_by_view: BTreeSet<ViewOrderedEdge> = persisted
            .into_iter()
            .map(|edge| ViewOrderedEdge::new(self.view_of(&edge), edge))
            .collect();

        let left: Box<dyn SortedIterator<Item = ViewOrderedEdge>> =
            Box::new(VecSortedIterator::new(buffered_by_view.into_iter().collect()));
        let right: Box<dyn SortedIterator<Item = ViewOrderedEdge>> =
            Box::new(VecSortedIterator::new(persisted_by_view.into_iter().collect()));

        // Overlay union (spec.md §9): merge two view-IID-ordered streams and
        // de-duplicate rather than doing any set-membership check. `Edge`
        // has no single natural `Ord` (the same edge sorts differently
        // depending on which endpoint's view it is keyed by), so the stream
        // carries the view IID alongside the edge instead of ordering `Edge`
        // directly.
        Ok(Box::new(Distinct::new(Merge::new(vec![left, right]))))
    }

    /// Enumerate every edge of this `(owner, direction)`, any encoding, with
    /// no lookahead narrowing and no ordering guarantee (spec.md §4.4
    /// "unsorted full scan"). Each edge is tagged with whether it was found
    /// in storage (`true`) or only buffered (`false`) — callers that must
    /// remove a persisted mirror view (spec.md §8 "Mirror consistency")
    /// need to tell the two apart, since a buffered edge has no persisted
    /// key to remove yet.
    pub fn full_scan<S: Storage>(&self, storage: &S) -> GraphResult<Vec<(Edge, bool)>> {
        let mut out = Vec::new();

        if self.posture != Posture::Read
            && let Some(bucket) = self.store.bucket(&self.owner, self.direction)
        {
            out.extend(bucket.payload.values().cloned().map(|edge| (edge, false)));
        }

        if self.posture != Posture::WriteOverBuffered {
            for encoding in Encoding::ALL {
                let infix = encoding.infix(self.direction);
                let mut owner_and_infix_prefix = self.owner.as_bytes().to_vec();
                owner_and_infix_prefix.push(infix);
                let mut scan = storage
                    .iterate(&owner_and_infix_prefix)
                    .map_err(|err| GraphError::storage_failure(ErrorOrigin::Adjacency, err))?;
                while let Some(entry) = scan.next() {
                    let edge = if encoding.is_optimised() {
                        self.decode_persisted_roleplayer(infix, &entry.key, &entry.value)?
                    } else {
                        self.decode_persisted_base(infix, &entry.key, &entry.value)
                    };
                    out.push((edge, true));
                }
            }
        }

        Ok(out)
    }

    fn view_of(&self, edge: &Edge) -> EdgeViewIID {
        match self.direction {
            Direction::Forward => edge.forward_view(),
            Direction::Backward => edge.backward_view(),
        }
    }

    fn scan_persisted<S: Storage>(
        &self,
        storage: &S,
        infix: u8,
        full_chain: &[Vec<u8>],
        lookahead_depth: usize,
    ) -> GraphResult<Vec<Edge>> {
        let mut owner_and_infix_prefix = self.owner.as_bytes().to_vec();
        owner_and_infix_prefix.push(infix);

        let mut scan = storage
            .iterate(&owner_and_infix_prefix)
            .map_err(|err| GraphError::storage_failure(ErrorOrigin::Adjacency, err))?;

        let target_suffix = {
            let mut bytes = Vec::new();
            for component in &full_chain[..lookahead_depth] {
                bytes.extend_from_slice(component);
            }
            bytes
        };
        let role_typed = full_chain.len() == Encoding::RolePlayer.lookahead_len();

        let mut matches = Vec::new();
        while let Some(entry) = scan.next() {
            let adjacent_and_suffix = &entry.key[owner_and_infix_prefix.len()..];
            if role_typed {
                // ROLEPLAYER: the real key has adjacent before role instance,
                // so recompute the logical chain from the decoded parts
                // rather than matching raw bytes (see module doc).
                let edge = self.decode_persisted_roleplayer(infix, &entry.key, &entry.value)?;
                let Some(role_instance) = &edge.role_instance else {
                    continue;
                };
                let role_type = VertexIID::type_vertex(
                    crate::iid::VertexKind::RoleType,
                    role_instance.type_id(),
                );
                let chain = role_player_lookahead_components(&role_type, self.adjacent_of(&edge));
                let candidate_suffix: Vec<u8> = chain[..lookahead_depth]
                    .iter()
                    .flat_map(|component| component.iter().copied())
                    .collect();
                if candidate_suffix == target_suffix {
                    matches.push(edge);
                }
            } else if adjacent_and_suffix.starts_with(&target_suffix) {
                matches.push(self.decode_persisted_base(infix, &entry.key, &entry.value));
            }
        }
        Ok(matches)
    }

    fn adjacent_of<'e>(&self, edge: &'e Edge) -> &'e VertexIID {
        match self.direction {
            Direction::Forward => &edge.to,
            Direction::Backward => &edge.from,
        }
    }

    fn decode_persisted_base(&self, infix: u8, key: &[u8], value: &[u8]) -> Edge {
        let (encoding, direction) = Encoding::from_infix(infix).expect("stored infix is always valid");
        let adjacent_bytes = &key[self.owner.as_bytes().len() + 1..];
        let adjacent = VertexIID::try_from_bytes(adjacent_bytes).expect("stored adjacent IID is always valid");
        let (from, to) = match direction {
            Direction::Forward => (self.owner.clone(), adjacent),
            Direction::Backward => (adjacent, self.owner.clone()),
        };
        let mut edge = Edge::new(encoding, from, to, false);
        if !value.is_empty()
            && let Ok(overridden) = VertexIID::try_from_bytes(value)
        {
            edge.overridden = Some(overridden);
        }
        edge
    }

    fn decode_persisted_roleplayer(&self, infix: u8, key: &[u8], _value: &[u8]) -> GraphResult<Edge> {
        let (encoding, direction) = Encoding::from_infix(infix).expect("stored infix is always valid");
        let tail = &key[self.owner.as_bytes().len() + 1..];
        // adjacent IID length is either 9 (type-shaped) or 17
        // (thing-shaped); the role-instance suffix that follows is always a
        // 17-byte thing vertex IID (spec.md §3: role vertices are things).
        let adjacent_len = tail.len().checked_sub(17).ok_or_else(|| {
            GraphError::new(
                crate::error::ErrorClass::Corruption,
                ErrorOrigin::Adjacency,
                "role-player edge view shorter than a role-instance suffix",
            )
        })?;
        let adjacent = VertexIID::try_from_bytes(&tail[..adjacent_len])
            .map_err(|message| GraphError::new(crate::error::ErrorClass::Corruption, ErrorOrigin::Adjacency, message))?;
        let role_instance = VertexIID::try_from_bytes(&tail[adjacent_len..])
            .map_err(|message| GraphError::new(crate::error::ErrorClass::Corruption, ErrorOrigin::Adjacency, message))?;
        let (from, to) = match direction {
            Direction::Forward => (self.owner.clone(), adjacent),
            Direction::Backward => (adjacent, self.owner.clone()),
        };
        Ok(Edge::new(encoding, from, to, false).with_role_instance(role_instance))
    }

    /// Create, or idempotently rediscover, a buffered edge (spec.md §4.4
    /// "Mirror registration"). `reflexive` must be `true` on the caller's
    /// original call and `false` on the mirrored call the implementation
    /// issues on the other endpoint, to avoid a cyclic `put` (spec.md §9
    /// "Mirror cycles").
    pub fn put(
        &mut self,
        encoding: Encoding,
        adjacent: &VertexIID,
        role: Option<(VertexIID, VertexIID)>,
        is_inferred: bool,
    ) -> GraphResult<Edge> {
        self.put_inner(encoding, adjacent, role, is_inferred, true)
    }

    fn put_inner(
        &mut self,
        encoding: Encoding,
        adjacent: &VertexIID,
        role: Option<(VertexIID, VertexIID)>,
        is_inferred: bool,
        reflexive: bool,
    ) -> GraphResult<Edge> {
        assert_eq!(
            encoding.is_optimised(),
            role.is_some(),
            "role must be supplied iff encoding is optimised"
        );

        let (from, to) = match self.direction {
            Direction::Forward => (self.owner.clone(), adjacent.clone()),
            Direction::Backward => (adjacent.clone(), self.owner.clone()),
        };
        let role_instance = role.as_ref().map(|(_, instance)| instance.clone());
        let mut edge = Edge::new(encoding, from, to, is_inferred);
        if let Some(role_instance) = role_instance.clone() {
            edge = edge.with_role_instance(role_instance);
        }
        let view = self.view_of(&edge);

        let chain = match &role {
            Some((role_type, _)) => role_player_lookahead_components(role_type, adjacent),
            None => base_lookahead_components(adjacent),
        };
        let infix = encoding.infix(self.direction);

        let bucket = self.store.bucket_mut(&self.owner, self.direction);
        if let Some(existing) = bucket.payload.get(&view) {
            assert_eq!(
                existing.is_inferred, is_inferred,
                "re-put of an already-buffered edge must agree on isInferred"
            );
            return Ok(existing.clone());
        }

        bucket.insert(view, &chain, infix, edge.clone());
        self.store.modified.insert(self.owner.clone());

        sink::record(MetricsEvent::AdjacencyPut { reflexive });

        if reflexive {
            // No live `Adjacency` exists for the other endpoint right now;
            // register the mirror entry directly against the shared store
            // rather than re-entering through a second `Adjacency` value,
            // since that would require two simultaneous `&mut` borrows of
            // the same `AdjacencyStore`.
            let mirror_direction = self.direction.flip();
            let mirror_owner = adjacent.clone();
            let mirror_chain = match &role {
                Some((role_type, _)) => role_player_lookahead_components(role_type, &self.owner),
                None => base_lookahead_components(&self.owner),
            };
            let mirror_infix = encoding.infix(mirror_direction);
            let mirror_view = match mirror_direction {
                Direction::Forward => edge.forward_view(),
                Direction::Backward => edge.backward_view(),
            };
            let mirror_bucket = self.store.bucket_mut(&mirror_owner, mirror_direction);
            if mirror_bucket.payload.get(&mirror_view).is_none() {
                mirror_bucket.insert(mirror_view, &mirror_chain, mirror_infix, edge.clone());
                self.store.modified.insert(mirror_owner);
            }
        }

        Ok(edge)
    }

    /// Delete every buffered edge of `encoding` matching the given
    /// lookahead (spec.md §4.4 `delete`); inferred edges are simply dropped,
    /// never written, matching the commit-time rule (spec.md §9 open
    /// question, resolved: inferred edges never reach storage at all, so
    /// dropping them from a buffer-only `delete` is consistent).
    pub fn delete(&mut self, encoding: Encoding, adjacent: &VertexIID, role_type: Option<&VertexIID>) {
        let chain = self.lookahead_for(encoding, adjacent, role_type);
        let infix = encoding.infix(self.direction);
        let prefix = chain_prefix_bytes(infix, &chain, chain.len());
        if let Some(bucket) = self.store.buckets.get_mut(&(self.owner.clone(), self.direction))
            && let Some(views) = bucket.by_chain_prefix.get(&prefix).cloned()
        {
            for view in views {
                bucket.remove(&view, &chain, infix);
            }
            self.store.modified.insert(self.owner.clone());
        }
    }

    /// Remove one specific buffered edge by value.
    pub fn remove(&mut self, edge: &Edge) {
        let adjacent = self.adjacent_of(edge).clone();
        let role_type = edge
            .role_instance
            .as_ref()
            .map(|role_instance| VertexIID::type_vertex(crate::iid::VertexKind::RoleType, role_instance.type_id()));
        self.delete(edge.encoding, &adjacent, role_type.as_ref());
    }

    /// Drop every buffered edge for this `(owner, direction)`.
    pub fn delete_all(&mut self) {
        if let Some(bucket) = self.store.buckets.get_mut(&(self.owner.clone(), self.direction)) {
            *bucket = AdjacencyBucket::default();
            self.store.modified.insert(self.owner.clone());
        }
    }

    /// Persist every non-inferred buffered edge of this `(owner, direction)`
    /// by writing its forward view (spec.md §4.4 `commit`: "via the mirror
    /// on the forward side only"). Called once per modified vertex by
    /// [`crate::graph::Graph::commit`]; calling it on both endpoints of the
    /// same edge is harmless since only the forward-side call writes.
    pub fn commit<S: Storage>(&mut self, storage: &mut S) -> GraphResult<u64> {
        let Some(bucket) = self.store.buckets.get(&(self.owner.clone(), self.direction)) else {
            return Ok(0);
        };
        let mut written = 0u64;
        for edge in bucket.payload.values() {
            if edge.is_inferred {
                continue;
            }
            if self.direction != Direction::Forward {
                continue;
            }
            let forward = edge.forward_view();
            let backward = edge.backward_view();
            let value = edge.overridden.as_ref().map_or_else(Vec::new, |overridden| overridden.as_bytes().to_vec());
            storage
                .put(forward.as_bytes().to_vec(), value.clone())
                .map_err(|err| GraphError::storage_failure(ErrorOrigin::Adjacency, err))?;
            storage
                .put(backward.as_bytes().to_vec(), value)
                .map_err(|err| GraphError::storage_failure(ErrorOrigin::Adjacency, err))?;
            written += 1;
        }
        sink::record(MetricsEvent::AdjacencyCommit { edges_written: written });
        Ok(written)
    }
}

/// An edge paired with the view IID it was filed under, so the iterator
/// algebra can order and de-duplicate by view IID (spec.md §4.4 "Ordering")
/// without requiring a single, direction-independent `Ord` on [`Edge`]
/// itself — the same edge sorts differently as a forward view than as a
/// backward view, so `Ord` has to live on this pairing, not on `Edge`.
#[derive(Clone, Debug)]
pub struct ViewOrderedEdge {
    pub view: EdgeViewIID,
    pub edge: Edge,
}

impl ViewOrderedEdge {
    const fn new(view: EdgeViewIID, edge: Edge) -> Self {
        Self { view, edge }
    }
}

impl PartialEq for ViewOrderedEdge {
    fn eq(&self, other: &Self) -> bool {
        self.view == other.view
    }
}
impl Eq for ViewOrderedEdge {}
impl PartialOrd for ViewOrderedEdge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ViewOrderedEdge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.view.cmp(&other.view)
    }
}
