//! Variable-to-vertex binding produced by one traversal answer (spec.md
//! §6 "Iterator<VertexMap>").

use super::procedure::ProcedureVertexId;
use crate::iid::VertexIID;
use std::collections::BTreeMap;

/// An ordered map is used rather than a `HashMap` so that `VertexMap`
/// itself can be hashed and deduplicated (spec.md §4.6 step 6 "`distinct`
/// is applied over emitted bindings restricted to the filter").
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexMap(BTreeMap<ProcedureVertexId, VertexIID>);

impl VertexMap {
    #[must_use]
    pub(super) fn new(bindings: std::collections::HashMap<ProcedureVertexId, VertexIID>) -> Self {
        Self(bindings.into_iter().collect())
    }

    #[must_use]
    pub fn get(&self, id: ProcedureVertexId) -> Option<&VertexIID> {
        self.0.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProcedureVertexId, &VertexIID)> {
        self.0.iter()
    }

    /// Project onto `filter`'s retrievable identifiers; an empty filter is
    /// treated as "retrieve everything" (spec.md §4.6 "filter set of
    /// retrievable identifiers").
    #[must_use]
    pub(super) fn restrict(&self, filter: &[ProcedureVertexId]) -> Self {
        if filter.is_empty() {
            return self.clone();
        }
        Self(
            self.0
                .iter()
                .filter(|(id, _)| filter.contains(id))
                .map(|(id, iid)| (*id, iid.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iid::VertexKind;

    #[test]
    fn restrict_to_empty_filter_keeps_every_binding() {
        let mut bindings = std::collections::HashMap::new();
        bindings.insert(ProcedureVertexId(1), VertexIID::thing_vertex(VertexKind::Entity, 1, 1));
        let map = VertexMap::new(bindings);
        assert_eq!(map.restrict(&[]).iter().count(), 1);
    }

    #[test]
    fn restrict_drops_vertices_outside_the_filter() {
        let mut bindings = std::collections::HashMap::new();
        bindings.insert(ProcedureVertexId(1), VertexIID::thing_vertex(VertexKind::Entity, 1, 1));
        bindings.insert(ProcedureVertexId(2), VertexIID::thing_vertex(VertexKind::Entity, 1, 2));
        let map = VertexMap::new(bindings);
        let restricted = map.restrict(&[ProcedureVertexId(1)]);
        assert!(restricted.get(ProcedureVertexId(1)).is_some());
        assert!(restricted.get(ProcedureVertexId(2)).is_none());
    }
}
