//! Compiled traversal plan (spec.md §4.6): a DAG of [`ProcedureVertex`]
//! nodes connected by totally ordered [`ProcedureEdge`] steps `1..n`.
//!
//! This module owns no execution state — it is the static, immutable plan
//! that [`super::executor::GraphIterator`] walks. Grounded in the data
//! model's own Type/Thing split (`model::vertex::Vertex`): a procedure
//! vertex carries the same kind split plus the extra properties (allowed
//! types, value predicates, scope) the planner attaches to narrow a step's
//! candidates before the executor ever touches storage.

use crate::iid::{Direction, Encoding, VertexIID, VertexKind};
use std::collections::HashMap;

/// Identifies one vertex in a compiled procedure. Procedures are built
/// once by the planner and then only ever read, so a plain `u32` key (no
/// generation counter) is enough.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ProcedureVertexId(pub u32);

/// Equality predicate over an attribute's typed value. Attribute vertices
/// are content-addressed (spec.md §3: `sha256(typeId || valueBytes)`), so
/// evaluating "does this vertex hold value X" never needs to decode a
/// stored value back out — it recomputes the content address `X` would
/// produce and compares IIDs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValuePredicate {
    expected_iid: VertexIID,
}

impl ValuePredicate {
    /// Build a predicate for `value_bytes` under the attribute type
    /// `type_id` (spec.md §3 content-addressing).
    #[must_use]
    pub fn equals(type_id: u64, value_bytes: &[u8]) -> Self {
        Self {
            expected_iid: VertexIID::attribute_vertex(type_id, value_bytes),
        }
    }

    #[must_use]
    pub fn accepts(&self, candidate: &VertexIID) -> bool {
        candidate == &self.expected_iid
    }
}

/// Properties a procedure vertex filters candidates by (spec.md §4.6
/// "carry properties: allowed labels … allowed instance types … value
/// predicates").
#[derive(Clone, Debug, Default)]
pub struct VertexProperties {
    /// Empty means unconstrained. A single entry is used as the lookahead
    /// template passed to [`crate::graph::Graph::out_edges`]/`in_edges`;
    /// more than one falls back to a full encoding-level scan
    /// (`lookahead_depth = 0`) filtered in memory against this list.
    pub allowed_type_iids: Vec<VertexIID>,
    pub value_predicate: Option<ValuePredicate>,
}

impl VertexProperties {
    /// Does `candidate` (a thing vertex reached by a traversal step)
    /// satisfy this vertex's type and value constraints? `allowed_type_iids`
    /// is checked by the candidate's encoded `type_id` (spec.md §3: every
    /// thing vertex's type segment), not by decoding a full type vertex.
    #[must_use]
    pub fn accepts_thing(&self, candidate: &VertexIID) -> bool {
        if !self.accepts_type_id(candidate.type_id()) {
            return false;
        }
        match &self.value_predicate {
            Some(predicate) => predicate.accepts(candidate),
            None => true,
        }
    }

    /// Does `type_iid` (a type vertex reached by a traversal step, e.g. a
    /// SUB step) satisfy this vertex's allowed-labels constraint?
    #[must_use]
    pub fn accepts_type(&self, type_iid: &VertexIID) -> bool {
        self.allowed_type_iids.is_empty() || self.allowed_type_iids.iter().any(|t| t == type_iid)
    }

    fn accepts_type_id(&self, type_id: u64) -> bool {
        self.allowed_type_iids.is_empty() || self.allowed_type_iids.iter().any(|t| t.type_id() == type_id)
    }

    /// The single allowed type, when exactly one is declared — used by the
    /// executor to build a narrow lookahead template instead of a full
    /// encoding-level scan.
    #[must_use]
    pub fn sole_allowed_type(&self) -> Option<&VertexIID> {
        match self.allowed_type_iids.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// Mirrors the data model's Thing/Type split (spec.md §4.6 "Vertex kinds
/// in the procedure mirror the data model"). Each variant carries its own
/// [`VertexKind`] (e.g. `Entity`, `RelationType`) — the planner always
/// knows which of the four thing shapes or four type shapes a procedure
/// vertex ranges over, even when `allowed_type_iids` leaves the specific
/// type unconstrained, so the executor never has to infer it.
#[derive(Clone, Debug)]
pub enum ProcedureVertex {
    Type(VertexKind, VertexProperties),
    Thing(VertexKind, VertexProperties),
}

impl ProcedureVertex {
    #[must_use]
    pub const fn properties(&self) -> &VertexProperties {
        match self {
            Self::Type(_, props) | Self::Thing(_, props) => props,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> VertexKind {
        match self {
            Self::Type(kind, _) | Self::Thing(kind, _) => *kind,
        }
    }

    #[must_use]
    pub const fn is_thing(&self) -> bool {
        matches!(self, Self::Thing(..))
    }
}

/// The `(relation, roleType, player, repetition)` identity a ROLEPLAYER
/// step is compiled against (spec.md §4.6 "Scopes"). `relation` and
/// `player` name procedure vertices rather than literal IIDs since the
/// scope is only resolvable once those vertices are bound at runtime.
#[derive(Clone, Debug)]
pub struct ScopeTemplate {
    pub relation: ProcedureVertexId,
    pub role_type: VertexIID,
    pub player: ProcedureVertexId,
    pub repetition: u32,
}

/// One step of the compiled plan (spec.md §4.6 steps `1..n`).
#[derive(Clone, Debug)]
pub struct ProcedureEdge {
    /// 1-indexed position in the search order.
    pub step: u32,
    pub source: ProcedureVertexId,
    pub target: ProcedureVertexId,
    pub encoding: Encoding,
    pub direction: Direction,
    /// `Some` iff `encoding` is optimised (ROLEPLAYER).
    pub role_type: Option<VertexIID>,
    pub scope: Option<ScopeTemplate>,
}

/// A compiled procedure: vertices, their totally ordered edges, and the
/// one starting vertex (spec.md §4.6 "Exactly one vertex is marked
/// isStartingVertex").
#[derive(Clone, Debug)]
pub struct Procedure {
    vertices: HashMap<ProcedureVertexId, ProcedureVertex>,
    edges: Vec<ProcedureEdge>,
    starting_vertex: ProcedureVertexId,
}

impl Procedure {
    /// `edges` must already be sorted by `step` and numbered densely
    /// `1..=edges.len()` — this is an invariant of the compiler, not
    /// something this type re-derives.
    #[must_use]
    pub fn new(
        vertices: HashMap<ProcedureVertexId, ProcedureVertex>,
        edges: Vec<ProcedureEdge>,
        starting_vertex: ProcedureVertexId,
    ) -> Self {
        debug_assert!(vertices.contains_key(&starting_vertex));
        debug_assert!(edges.iter().enumerate().all(|(i, e)| e.step as usize == i + 1));
        Self { vertices, edges, starting_vertex }
    }

    #[must_use]
    pub const fn starting_vertex(&self) -> ProcedureVertexId {
        self.starting_vertex
    }

    #[must_use]
    pub fn vertex(&self, id: ProcedureVertexId) -> &ProcedureVertex {
        self.vertices.get(&id).expect("procedure vertex ids are only ever drawn from this procedure's own vertex map")
    }

    #[must_use]
    pub fn edges(&self) -> &[ProcedureEdge] {
        &self.edges
    }

    #[must_use]
    pub fn starting_properties(&self) -> &VertexProperties {
        self.vertex(self.starting_vertex).properties()
    }
}
