//! Backtracking procedure executor (spec.md §4.6 "Execution").
//!
//! No teacher or example-pack file implements a backtracking DFS over a
//! compiled edge plan — this is grounded instead in this crate's own
//! established idioms: [`crate::graph::adjacency::Adjacency`]'s
//! posture/lookahead design for how a step pulls candidates, and
//! [`crate::obs::sink`]'s `Span`/`MetricsEvent` conventions for how a step
//! is instrumented. See `DESIGN.md` for the explicit accounting of this
//! gap.
//!
//! The executor deliberately never performs the seek/skip optimization
//! spec.md §4.6 describes: it always backtracks one step at a time
//! (`retreat` pops exactly the top frame and retries its parent only once
//! that frame's own candidates are exhausted), per spec.md §9's guidance
//! to "default to disabling seek across closure boundaries" until a sound
//! dependency rule is characterized.

use super::{
    procedure::{Procedure, ProcedureEdge, ProcedureVertex, ProcedureVertexId},
    scope::{ScopeKey, ScopeTracker},
    vertex_map::VertexMap,
};
use crate::{
    error::GraphResult,
    graph::{edge_entity::EdgeEntity, Graph},
    iid::{Direction, Encoding, VertexIID},
    obs::sink::{Span, TraversalPhase},
    storage::Storage,
};
use std::collections::HashSet;

fn adjacent_of(entity: &EdgeEntity, direction: Direction) -> &VertexIID {
    match direction {
        Direction::Forward => entity.to(),
        Direction::Backward => entity.from(),
    }
}

/// A lookahead scan template and depth for one procedure vertex (spec.md
/// §4.4 lookahead). Exactly one allowed type narrows the scan to that
/// type's lookahead prefix; zero or several allowed types fall back to a
/// full encoding-level scan, filtered afterward in memory.
fn lookahead_template(vertex: &ProcedureVertex, encoding: Encoding) -> (VertexIID, usize) {
    match vertex.properties().sole_allowed_type() {
        Some(allowed_type) => {
            let template = if vertex.is_thing() {
                VertexIID::thing_vertex(vertex.kind(), allowed_type.type_id(), 0)
            } else {
                VertexIID::type_vertex(vertex.kind(), allowed_type.type_id())
            };
            (template, encoding.lookahead_len())
        }
        None => {
            let template = if vertex.is_thing() {
                VertexIID::thing_vertex(vertex.kind(), 0, 0)
            } else {
                VertexIID::type_vertex(vertex.kind(), 0)
            };
            (template, 0)
        }
    }
}

struct StepFrame {
    candidates: Vec<EdgeEntity>,
    cursor: usize,
    introduced_binding: bool,
    scope_key: Option<ScopeKey>,
}

impl StepFrame {
    const fn new(candidates: Vec<EdgeEntity>) -> Self {
        Self { candidates, cursor: 0, introduced_binding: false, scope_key: None }
    }
}

/// A single backtracking search from one starting binding (spec.md §4.6
/// steps 2-5). Pull-based: each [`Self::next`] call returns the next
/// complete binding, or `None` once every branch from this starting
/// vertex is exhausted.
pub struct GraphIterator<'p, S: Storage> {
    graph: &'p Graph<S>,
    procedure: &'p Procedure,
    bindings: std::collections::HashMap<ProcedureVertexId, VertexIID>,
    frames: Vec<StepFrame>,
    scopes: ScopeTracker,
    exhausted: bool,
}

impl<'p, S: Storage> GraphIterator<'p, S> {
    #[must_use]
    pub fn new(graph: &'p Graph<S>, procedure: &'p Procedure, starting_binding: VertexIID) -> Self {
        let mut bindings = std::collections::HashMap::new();
        bindings.insert(procedure.starting_vertex(), starting_binding);
        Self {
            graph,
            procedure,
            bindings,
            frames: Vec::new(),
            scopes: ScopeTracker::new(),
            exhausted: false,
        }
    }

    /// Pull the next complete variable binding (spec.md §4.6 step 4 "If
    /// `k = n`, emit the projection").
    pub fn next(&mut self) -> GraphResult<Option<VertexMap>> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            if self.frames.len() == self.procedure.edges().len() {
                let result = VertexMap::new(self.bindings.clone());
                if !self.retreat()? {
                    self.exhausted = true;
                }
                return Ok(Some(result));
            }
            if self.advance()? {
                continue;
            }
            if !self.retreat()? {
                self.exhausted = true;
                return Ok(None);
            }
        }
    }

    /// Attempt to open a new frame for the next unvisited step (spec.md
    /// §4.6 step 3). Returns `false`, without pushing a frame, when the
    /// step has no candidate consistent with the current bindings — the
    /// caller must then retreat the *previous* step instead.
    fn advance(&mut self) -> GraphResult<bool> {
        let step_idx = self.frames.len();
        let edge = self.procedure.edges()[step_idx].clone();
        let span = Span::new(edge.step, TraversalPhase::Advance);
        let source = self
            .bindings
            .get(&edge.source)
            .cloned()
            .expect("a step's source is always bound before the step runs (search order invariant)");
        let candidates = self.fetch_candidates(&edge, &source)?;
        let mut frame = StepFrame::new(candidates);
        let satisfied = self.try_satisfy(&edge, &mut frame);
        span.finish();
        if satisfied {
            self.frames.push(frame);
        }
        Ok(satisfied)
    }

    /// Pop the top frame and retry its remaining candidates (spec.md §4.6
    /// step 5). If the top frame's candidates are themselves exhausted,
    /// bubble up and retry its parent, and so on — this is the whole of
    /// the backtrack; no frame is ever skipped.
    fn retreat(&mut self) -> GraphResult<bool> {
        loop {
            if self.frames.is_empty() {
                return Ok(false);
            }
            let step_idx = self.frames.len() - 1;
            let edge = self.procedure.edges()[step_idx].clone();
            let span = Span::new(edge.step, TraversalPhase::Backtrack);
            let mut frame = self.frames.pop().expect("frames non-empty, checked above");
            if frame.introduced_binding {
                self.bindings.remove(&edge.target);
            }
            if let Some(scope_key) = frame.scope_key.take() {
                self.scopes.clear(&scope_key);
            }
            let satisfied = self.try_satisfy(&edge, &mut frame);
            span.finish();
            if satisfied {
                self.frames.push(frame);
                return Ok(true);
            }
            // This step's own candidates are exhausted too; loop to retry
            // whatever is now on top (its parent).
        }
    }

    fn fetch_candidates(&self, edge: &ProcedureEdge, source: &VertexIID) -> GraphResult<Vec<EdgeEntity>> {
        let target_vertex = self.procedure.vertex(edge.target);
        let (template, lookahead_depth) = lookahead_template(target_vertex, edge.encoding);
        let role_type = edge.role_type.as_ref();

        let raw = match edge.direction {
            Direction::Forward => self.graph.out_edges(source, edge.encoding, &template, role_type, lookahead_depth)?,
            Direction::Backward => self.graph.in_edges(source, edge.encoding, &template, role_type, lookahead_depth)?,
        };

        let properties = target_vertex.properties();
        Ok(raw
            .into_iter()
            .filter(|entity| {
                let adjacent = adjacent_of(entity, edge.direction);
                if target_vertex.is_thing() {
                    properties.accepts_thing(adjacent)
                } else {
                    properties.accepts_type(adjacent)
                }
            })
            .collect())
    }

    /// Scan `frame`'s remaining candidates from its cursor, binding and
    /// returning `true` on the first one consistent with the existing
    /// bindings and, if this edge is scoped, with the scope tracker.
    fn try_satisfy(&mut self, edge: &ProcedureEdge, frame: &mut StepFrame) -> bool {
        while frame.cursor < frame.candidates.len() {
            let entity = frame.candidates[frame.cursor].clone();
            frame.cursor += 1;
            let adjacent = adjacent_of(&entity, edge.direction).clone();

            let introduced = match self.bindings.get(&edge.target) {
                Some(existing) if existing == &adjacent => false,
                Some(_) => continue, // closure test failed; try the next candidate
                None => {
                    self.bindings.insert(edge.target, adjacent);
                    true
                }
            };
            frame.introduced_binding = introduced;

            if let Some(scope_template) = &edge.scope {
                let Some(role_instance) = entity.role_instance().cloned() else {
                    if introduced {
                        self.bindings.remove(&edge.target);
                    }
                    continue;
                };
                let scope_key = ScopeKey {
                    relation: self
                        .bindings
                        .get(&scope_template.relation)
                        .cloned()
                        .expect("a scope's relation vertex is bound before the scoped step runs"),
                    role_type: scope_template.role_type.clone(),
                    player: self
                        .bindings
                        .get(&scope_template.player)
                        .cloned()
                        .expect("a scope's player vertex is bound before the scoped step runs"),
                    repetition: scope_template.repetition,
                };
                if !self.scopes.try_enter(scope_key.clone(), role_instance) {
                    if introduced {
                        self.bindings.remove(&edge.target);
                    }
                    continue;
                }
                frame.scope_key = Some(scope_key);
            }

            return true;
        }
        false
    }
}

/// Drives [`GraphIterator`] over every starting candidate and applies the
/// final `distinct`-over-filter (spec.md §4.6 step 6).
pub struct ProcedureIterator<'p, S: Storage> {
    graph: &'p Graph<S>,
    procedure: &'p Procedure,
    filter: Vec<ProcedureVertexId>,
    starting_candidates: std::vec::IntoIter<VertexIID>,
    current: Option<GraphIterator<'p, S>>,
    seen: HashSet<VertexMap>,
}

impl<'p, S: Storage> ProcedureIterator<'p, S> {
    pub(super) fn new(graph: &'p Graph<S>, procedure: &'p Procedure, starting_candidates: Vec<VertexIID>, filter: Vec<ProcedureVertexId>) -> Self {
        Self {
            graph,
            procedure,
            filter,
            starting_candidates: starting_candidates.into_iter(),
            current: None,
            seen: HashSet::new(),
        }
    }

    /// Pull the next distinct, filter-projected binding, or `None` once
    /// every starting candidate's search space is exhausted.
    pub fn next(&mut self) -> GraphResult<Option<VertexMap>> {
        loop {
            if self.current.is_none() {
                let Some(start) = self.starting_candidates.next() else {
                    return Ok(None);
                };
                self.current = Some(GraphIterator::new(self.graph, self.procedure, start));
            }
            let Some(iterator) = self.current.as_mut() else {
                return Ok(None);
            };
            match iterator.next()? {
                Some(binding) => {
                    let projected = binding.restrict(&self.filter);
                    if self.seen.insert(projected.clone()) {
                        return Ok(Some(projected));
                    }
                    // duplicate under the filter projection; keep pulling
                }
                None => {
                    self.current = None;
                }
            }
        }
    }
}

impl Procedure {
    /// Build and drive a [`ProcedureIterator`] from caller-supplied
    /// starting candidates (spec.md §6 `Procedure.iterator(graph, params,
    /// filter)`). `params` are the concrete vertices available to bind
    /// the starting procedure vertex to — resolving a query's starting
    /// variable against the graph (by type, by label, by an upstream
    /// pipeline stage) is the query layer's job, out of scope here
    /// (spec.md §1 "Out of scope … the query language parser").
    pub fn iterator<'p, S: Storage>(
        &'p self,
        graph: &'p Graph<S>,
        params: Vec<VertexIID>,
        filter: Vec<ProcedureVertexId>,
    ) -> ProcedureIterator<'p, S> {
        ProcedureIterator::new(graph, self, self.accepted_starting_candidates(params), filter)
    }

    fn accepted_starting_candidates(&self, params: Vec<VertexIID>) -> Vec<VertexIID> {
        let starting = self.vertex(self.starting_vertex());
        let properties = starting.properties();
        let is_thing = starting.is_thing();
        params
            .into_iter()
            .filter(|candidate| if is_thing { properties.accepts_thing(candidate) } else { properties.accepts_type(candidate) })
            .collect()
    }

    /// Build a [`ProcedureProducer`] that partitions `params` round-robin
    /// across `parallelisation` independent workers (spec.md §5 "Parallel
    /// producers", spec.md §4.6, spec.md §6). There is no thread pool
    /// here — "worker" means one of `parallelisation` logical partitions of
    /// the starting candidates, each driven by its own [`ProcedureIterator`]
    /// and pulled round-robin, matching spec.md §5's pull-based, no
    /// implicit-thread-parking model. Ordering of results across workers is
    /// not guaranteed; within a worker, bindings are produced in procedure-edge
    /// order, exactly as [`Procedure::iterator`] produces them for a single
    /// worker covering every candidate.
    #[must_use]
    pub fn producer<'p, S: Storage>(
        &'p self,
        graph: &'p Graph<S>,
        params: Vec<VertexIID>,
        filter: Vec<ProcedureVertexId>,
        parallelisation: usize,
    ) -> ProcedureProducer<'p, S> {
        let parallelisation = parallelisation.max(1);
        let candidates = self.accepted_starting_candidates(params);
        let mut buckets: Vec<Vec<VertexIID>> = (0..parallelisation).map(|_| Vec::new()).collect();
        for (i, candidate) in candidates.into_iter().enumerate() {
            buckets[i % parallelisation].push(candidate);
        }
        let workers = buckets
            .into_iter()
            .map(|bucket| ProcedureIterator::new(graph, self, bucket, filter.clone()))
            .collect();
        ProcedureProducer::new(workers)
    }
}

/// Pulls round-robin from a fixed set of [`ProcedureIterator`] workers,
/// each covering a disjoint partition of the starting candidates (spec.md
/// §5 "Parallel producers"). Applies its own `distinct` over the combined
/// stream, on top of each worker's own per-worker `distinct`, since two
/// different workers' searches can still land on the same projected
/// binding.
pub struct ProcedureProducer<'p, S: Storage> {
    workers: Vec<ProcedureIterator<'p, S>>,
    cursor: usize,
    seen: HashSet<VertexMap>,
}

impl<'p, S: Storage> ProcedureProducer<'p, S> {
    fn new(workers: Vec<ProcedureIterator<'p, S>>) -> Self {
        Self { workers, cursor: 0, seen: HashSet::new() }
    }

    /// Number of logical workers this producer pulls from.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Pull the next distinct binding, trying each worker in round-robin
    /// order starting from the one after the last worker that produced a
    /// result. Returns `None` once every worker is exhausted.
    pub fn next(&mut self) -> GraphResult<Option<VertexMap>> {
        if self.workers.is_empty() {
            return Ok(None);
        }
        let mut exhausted_in_a_row = 0;
        loop {
            if exhausted_in_a_row >= self.workers.len() {
                return Ok(None);
            }
            let worker_idx = self.cursor % self.workers.len();
            self.cursor = self.cursor.wrapping_add(1);
            match self.workers[worker_idx].next()? {
                Some(binding) => {
                    exhausted_in_a_row = 0;
                    if self.seen.insert(binding.clone()) {
                        return Ok(Some(binding));
                    }
                    // duplicate across workers under the filter projection
                }
                None => exhausted_in_a_row += 1,
            }
        }
    }
}
