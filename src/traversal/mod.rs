//! Traversal procedure executor (spec.md §4.6): a compiled, ordered plan
//! of edge steps walked as a backtracking search over the overlay graph.
//!
//! [`procedure`] is the static compiled plan; [`scope`] tracks role-
//! instance scope identity across backtracks; [`executor`] is the
//! stateful DFS that walks the plan; [`vertex_map`] is the answer type it
//! yields.

pub mod executor;
pub mod procedure;
pub mod scope;
pub mod vertex_map;

pub use executor::{GraphIterator, ProcedureIterator, ProcedureProducer};
pub use procedure::{Procedure, ProcedureEdge, ProcedureVertex, ProcedureVertexId, ScopeTemplate, ValuePredicate, VertexProperties};
pub use scope::{ScopeKey, ScopeTracker};
pub use vertex_map::VertexMap;
