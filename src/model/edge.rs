//! Typed directed edge (spec.md §3 "Edges").
//!
//! An [`Edge`] is the attribute payload shared by its two endpoints' mirror
//! registrations in [`crate::graph::adjacency`]; it knows how to derive its
//! own forward and backward view IIDs but does not know how to reach
//! storage — that's [`crate::graph::edge_entity`].

use crate::iid::{Direction, EdgeViewIID, Encoding, VertexIID};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Edge {
    pub encoding: Encoding,
    pub from: VertexIID,
    pub to: VertexIID,
    /// For inherited type edges: the type this edge was overridden from.
    pub overridden: Option<VertexIID>,
    /// For ROLEPLAYER edges: the role-instance disambiguating the view.
    pub role_instance: Option<VertexIID>,
    pub is_inferred: bool,
}

impl Edge {
    #[must_use]
    pub const fn new(encoding: Encoding, from: VertexIID, to: VertexIID, is_inferred: bool) -> Self {
        Self {
            encoding,
            from,
            to,
            overridden: None,
            role_instance: None,
            is_inferred,
        }
    }

    #[must_use]
    pub fn with_role_instance(mut self, role_instance: VertexIID) -> Self {
        self.role_instance = Some(role_instance);
        self
    }

    #[must_use]
    pub fn with_overridden(mut self, overridden: VertexIID) -> Self {
        self.overridden = Some(overridden);
        self
    }

    /// View keyed by [`Self::from`] (spec.md §3: "forward (keyed by from)").
    #[must_use]
    pub fn forward_view(&self) -> EdgeViewIID {
        EdgeViewIID::new(
            &self.from,
            self.encoding,
            Direction::Forward,
            &self.to,
            self.role_instance.as_ref(),
        )
    }

    /// View keyed by [`Self::to`] (spec.md §3: "backward (keyed by to)").
    #[must_use]
    pub fn backward_view(&self) -> EdgeViewIID {
        EdgeViewIID::new(
            &self.to,
            self.encoding,
            Direction::Backward,
            &self.from,
            self.role_instance.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iid::VertexKind;

    #[test]
    fn forward_and_backward_views_are_distinct_and_keyed_correctly() {
        let from = VertexIID::thing_vertex(VertexKind::Entity, 1, 10);
        let to = VertexIID::thing_vertex(VertexKind::Entity, 1, 20);
        let edge = Edge::new(Encoding::Has, from.clone(), to.clone(), false);

        assert_ne!(edge.forward_view(), edge.backward_view());
        assert!(edge.forward_view().as_bytes().starts_with(from.as_bytes()));
        assert!(edge.backward_view().as_bytes().starts_with(to.as_bytes()));
    }
}
